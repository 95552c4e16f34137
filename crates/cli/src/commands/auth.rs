//! Session commands.

use std::io::BufRead;

use habaluna_storefront::Storefront;
use secrecy::SecretString;

use super::CliError;

/// Sign in, reading the password from the first line of stdin, then merge
/// the local cart into the account cart unless told not to.
#[allow(clippy::print_stdout)]
pub async fn login(storefront: &Storefront, email: &str, merge: bool) -> Result<(), CliError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = SecretString::from(line.trim_end_matches(['\r', '\n']).to_string());

    let user = storefront
        .auth()
        .login(storefront.api(), email, &password)
        .await?;
    match user {
        Some(user) => println!("Signed in as {} <{}>", user.display_name(), user.email),
        None => println!("Signed in"),
    }

    if merge {
        super::cart::merge(storefront).await?;
    }
    Ok(())
}

/// Forget the stored session along with the cart and wishlist.
#[allow(clippy::print_stdout)]
pub async fn logout(storefront: &Storefront) {
    storefront.logout().await;
    println!("Signed out");
}

/// Print the signed-in user.
#[allow(clippy::print_stdout)]
pub fn whoami(storefront: &Storefront) {
    let auth = storefront.auth();
    if !auth.is_authenticated() {
        println!("Not signed in");
        return;
    }
    match auth.user() {
        Some(user) => {
            println!("{} <{}>", user.display_name(), user.email);
            if let Some(role) = user.role {
                println!("role: {role}");
            }
        }
        None => println!("Signed in (no profile returned)"),
    }
}

//! `taskdeck login`, `register`, `logout` and `whoami`.

use crate::context::AppContext;
use crate::session::User;
use crate::validate::RegistrationForm;

/// Logs in and stores the session.
///
/// # Errors
///
/// Returns an error string for rejected credentials or backend failures.
pub async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<(), String> {
    let session = ctx.session_store().login(email, password).await.map_err(|e| e.to_string())?;
    println!("Logged in as {}", describe(&session.user));
    Ok(())
}

/// Creates an account. The caller logs in separately.
///
/// `confirm` defaults to `password`.
///
/// # Errors
///
/// Returns an error string for invalid fields, a duplicate email, or
/// backend failures.
pub async fn register(
    ctx: &AppContext,
    name: &str,
    email: &str,
    password: &str,
    confirm: Option<&str>,
) -> Result<(), String> {
    let form = RegistrationForm {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: confirm.unwrap_or(password).to_string(),
    };
    let registration = form.validate().map_err(|e| e.to_string())?;
    let user = ctx.session_store().register(registration).await.map_err(|e| e.to_string())?;
    println!("Registered {}. Run `taskdeck login` to sign in.", user.email);
    Ok(())
}

/// Forgets the stored session.
pub fn logout(ctx: &AppContext) {
    ctx.session_store().logout();
    println!("Logged out.");
}

/// Prints the current user, optionally re-reading the profile first.
///
/// # Errors
///
/// Returns an error string if the refresh fails; an expired session has
/// been cleared by then.
pub async fn whoami(ctx: &AppContext, refresh: bool) -> Result<(), String> {
    let store = ctx.session_store();
    if !store.is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }
    let user = if refresh {
        Some(store.refresh_profile().await.map_err(|e| e.to_string())?)
    } else {
        store.current_user()
    };
    match user {
        Some(user) => println!("{} ({})", describe(&user), user.role),
        None => println!("Logged in."),
    }
    Ok(())
}

fn describe(user: &User) -> String {
    format!("{} <{}>", user.name, user.email)
}

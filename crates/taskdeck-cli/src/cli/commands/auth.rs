//! Session command handlers (login, register, logout, whoami).

use anyhow::Result;
use taskdeck_core::auth::{self, TokenStore};
use taskdeck_core::config::Config;
use taskdeck_core::session::{
    Route, Session, SignInOutcome, SignUpDraft, SignUpOutcome,
};

pub async fn login(config: &Config, email: &str, password: &str) -> Result<()> {
    let store = TokenStore::new();
    if Route::resolve(Some(Route::SignIn), auth::is_authenticated(&store)) == Route::Tasks {
        println!("Already signed in. Try `taskdeck tasks list`, or `taskdeck logout` first.");
        return Ok(());
    }

    let client = super::api_client(config)?;
    let mut session = Session::new(store);

    match session.sign_in(&client, email, password).await? {
        SignInOutcome::SignedIn(identity) => {
            println!(
                "Signed in as {} (user id {}).",
                identity.user_name, identity.user_id
            );
            Ok(())
        }
        SignInOutcome::Rejected(failure) => {
            anyhow::bail!("Sign in failed: {failure}");
        }
    }
}

pub async fn register(
    config: &Config,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
) -> Result<()> {
    let client = super::api_client(config)?;
    let draft = SignUpDraft {
        first_name,
        last_name,
        email,
        password,
    };

    match Session::sign_up(&client, &draft).await {
        SignUpOutcome::Registered => {
            println!("Account created. Please sign in with `taskdeck login`.");
            Ok(())
        }
        SignUpOutcome::Invalid(errors) => {
            let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
            anyhow::bail!("Sign up not submitted:\n  {}", lines.join("\n  "));
        }
        SignUpOutcome::Rejected(failure) => {
            anyhow::bail!("Sign up failed: {failure}");
        }
    }
}

pub fn logout() -> Result<()> {
    let store = TokenStore::new();
    if !auth::is_authenticated(&store) {
        println!("No active session.");
        return Ok(());
    }

    let mut session = Session::new(store);
    session.sign_out()?;
    println!("Signed out.");
    Ok(())
}

pub fn whoami() -> Result<()> {
    let store = TokenStore::new();
    if auth::is_authenticated(&store) {
        // The display name is captured only at sign-in and never cached.
        println!("Signed in (identity is only known to the process that signed in).");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

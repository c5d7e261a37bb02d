//! Account commands.

use clipsync_identity::{AuthForm, AuthMode, AuthProvider};

use crate::app::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Email,
    Password,
}

/// Read one field from the terminal. The password is never echoed.
fn read_field(field: Field) -> anyhow::Result<String> {
    let value = match field {
        Field::Email => dialoguer::Input::<String>::new()
            .with_prompt("Email")
            .allow_empty(true)
            .interact_text()?,
        // Empty input is rejected by the form, with its own message.
        Field::Password => dialoguer::Password::new()
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()?,
    };
    Ok(value)
}

fn fill_credentials(
    form: &mut AuthForm,
    email: Option<String>,
    mut read: impl FnMut(Field) -> anyhow::Result<String>,
) -> anyhow::Result<()> {
    form.email = match email {
        Some(email) => email,
        None => read(Field::Email)?,
    };
    form.password = read(Field::Password)?;
    Ok(())
}

async fn submit(app: &App, mode: AuthMode, email: Option<String>) -> anyhow::Result<()> {
    let mut form = AuthForm::new(mode);
    println!("{}", form.mode().title());
    fill_credentials(&mut form, email, read_field)?;

    match form.submit(app.auth.as_ref()).await {
        Ok(identity) => {
            tracing::info!(%identity, "Signed in");
            println!("Signed in as {}", form.email.trim());
            Ok(())
        }
        Err(e) => {
            tracing::debug!(code = e.code(), "Authentication failed");
            anyhow::bail!(e.user_message())
        }
    }
}

pub async fn signup(app: &App, email: Option<String>) -> anyhow::Result<()> {
    submit(app, AuthMode::Register, email).await
}

pub async fn login(app: &App, email: Option<String>) -> anyhow::Result<()> {
    submit(app, AuthMode::Login, email).await
}

pub async fn logout(app: &App) -> anyhow::Result<()> {
    app.auth
        .sign_out()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("Signed out");
    Ok(())
}

pub async fn whoami(app: &App) -> anyhow::Result<()> {
    match app.auth.current_email().await {
        Some(email) => println!("{email}"),
        None => println!("Not signed in"),
    }
    Ok(())
}

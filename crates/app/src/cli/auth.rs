use clap::Args;
use storefront_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn login(context: &AppContext, args: LoginArgs) -> Result<(), String> {
    let user = context
        .auth
        .login(&args.email, &args.password)
        .await
        .map_err(|error| error.user_message())?;

    println!("signed in as {}", user.display_name());

    Ok(())
}

pub(crate) async fn logout(context: &AppContext) -> Result<(), String> {
    context
        .auth
        .logout()
        .await
        .map_err(|error| format!("failed to sign out: {error}"))?;

    println!("signed out");

    Ok(())
}

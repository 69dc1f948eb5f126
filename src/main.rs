use std::sync::Arc;

use logitron::config::{load_config, print_schema};
use logitron::session::{load_theme, save_theme, toggle_theme, ThemeMode};
use logitron::startup;
use logitron::state::AppContext;
use logitron::utils::logger::init_logging;

fn usage() -> ! {
    eprintln!("Usage: logitron <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  login <username> <password>      Sign in and persist the session");
    eprintln!("  me                               Show the current identity");
    eprintln!("  logout                           Sign out and clear the session");
    eprintln!("  change-password <current> <new>  Change the password");
    eprintln!("  theme [light|dark|toggle]        Show or change the theme preference");
    eprintln!("  schema                           Print the configuration JSON schema");
    std::process::exit(2);
}

fn print_notifications(ctx: &AppContext) {
    for notification in ctx.notifier.active() {
        println!(
            "[{}] {}: {}",
            notification.severity, notification.title, notification.description
        );
    }
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("schema") {
        print_schema();
        return;
    }

    let config = Arc::new(load_config());
    init_logging(&config.logging);

    let ctx = startup::build(config).await;
    ctx.session_manager.initialize().await;

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["login", username, password] => {
            let _ = ctx.session_manager.login(username, password).await;
        }
        ["me"] => match ctx.session_manager.current_user() {
            Some(user) => println!(
                "{} <{}> ({})",
                user.display_name(),
                user.email,
                user.username
            ),
            None => println!("Not signed in."),
        },
        ["logout"] => {
            ctx.session_manager.logout().await;
        }
        ["change-password", current, new] => {
            let _ = ctx.session_manager.change_password(current, new).await;
        }
        ["theme"] => println!("{}", load_theme(ctx.store.as_ref()).await),
        ["theme", "toggle"] => match toggle_theme(ctx.store.as_ref()).await {
            Ok(mode) => println!("{}", mode),
            Err(e) => eprintln!("Cannot persist theme: {}", e),
        },
        ["theme", raw] => match ThemeMode::parse(raw) {
            Some(mode) => match save_theme(ctx.store.as_ref(), mode).await {
                Ok(()) => println!("{}", mode),
                Err(e) => eprintln!("Cannot persist theme: {}", e),
            },
            None => usage(),
        },
        _ => usage(),
    }

    print_notifications(&ctx);
}

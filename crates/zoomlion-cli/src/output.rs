use colored::Colorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use zoomlion_auth::{LoginOutcome, Principal};

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_principals(principals: &[Principal], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(principals),
        OutputFormat::Table => {
            if principals.is_empty() {
                println!("No principals found.");
                return Ok(());
            }
            println!("{}", principals_table(principals));
            Ok(())
        }
    }
}

pub fn print_principal(principal: &Principal, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(principal),
        OutputFormat::Table => {
            println!("{}: {}", "Id".cyan(), principal.id);
            println!("{}: {}", "Name".cyan(), principal.display_name);
            println!("{}: {}", "Login".cyan(), principal.login_name);
            println!("{}: {}", "Type".cyan(), principal.principal_type.as_str());
            if !principal.profile_picture.is_empty() {
                println!("{}: {}", "Avatar".cyan(), principal.profile_picture);
            }
            println!("{}: {}", "Me".cyan(), yes_no(principal.me));
            println!("{}: {}", "Member".cyan(), yes_no(principal.member_of));
            Ok(())
        }
    }
}

/// JSON view of a login outcome. The access token is left out.
pub fn outcome_json(outcome: &LoginOutcome) -> serde_json::Value {
    serde_json::json!({
        "userPrincipal": outcome.user_principal,
        "groupPrincipals": outcome.group_principals,
    })
}

fn principals_table(principals: &[Principal]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Login", "Type", "Me", "Member"]);
    for p in principals {
        builder.push_record([
            p.id.as_str(),
            p.display_name.as_str(),
            p.login_name.as_str(),
            p.principal_type.as_str(),
            yes_no(p.me),
            yes_no(p.member_of),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "-" }
}

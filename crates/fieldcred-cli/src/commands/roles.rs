//! Role catalog command

use console::style;
use fieldcred_core::Role;

pub fn list() {
    println!("\n{}", style("Roles").bold().underlined());
    println!();

    for role in Role::ALL {
        println!(
            "  {:<15} {}",
            style(role.as_str()).cyan(),
            style(role.label()).bold()
        );
        println!("  {:<15} {}", "", style(role.description()).dim());
        for permission in role.permissions() {
            println!("  {:<15} • {}", "", permission);
        }
        println!();
    }
}

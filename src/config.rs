// ABOUTME: Version and REPL banner constants

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "Lox Interpreter";
pub const WELCOME_SUBTITLE: &str = "A tree-walking interpreter for the Lox language";

pub const HELP_TEXT: &str = r#"
Type any Lox statement to execute it.
A bare expression statement echoes its value.
Use Ctrl-D to exit.
"#;

// File: ./src/cli.rs
//! Shared command-line interface logic, like printing help.

pub fn print_help(binary_name: &str) {
    println!(
        "Quickadd v{} - Natural-language task capture",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("Turns a free-text note into a structured task record (title, due date,");
    println!("urgency) plus a follow-up question for whatever is still missing.");
    println!();
    println!("USAGE:");
    println!("    {} [OPTIONS] \"<text>\"", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -o, --offline         Skip the extraction service, use the rule-based");
    println!("                          parser only.");
    println!("    -p, --pretty          Pretty-print the JSON output.");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("OUTPUT:");
    println!("    A JSON object on stdout:");
    println!("      title        task description, stripped of date/time/urgency wording");
    println!("      dueDate      ISO-8601 timestamp, always in the future, or null");
    println!("      urgency      1-5, or null");
    println!("      followUp     the next question to ask the user");
    println!("      stillNeeded  which of title/date/urgency are still missing");
    println!("      suggestions  candidate values for the missing fields");
    println!();
    println!("EXAMPLES:");
    println!("    {} \"Call mom tomorrow at 5pm\"", binary_name);
    println!("    {} \"Submit report by friday afternoon, urgency 5\"", binary_name);
    println!("    {} --offline \"Gym every monday at 7am\"", binary_name);
    println!();
    println!("CONFIGURATION:");
    println!("    The extraction service (endpoint, model, api_key, timeout_seconds)");
    println!("    is read from config.toml in the platform config directory; the API");
    println!("    key can also be passed via the QUICKADD_API_KEY environment");
    println!("    variable. Without a key, parsing silently runs offline.");
}

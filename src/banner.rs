use colored::Colorize;

const ASCII_ART: &str = r"
        █▀ █░█ █▄▄ █░█ █░█ █▄░█ ▀█▀ █▀▀ █▀█
        ▄█ █▄█ █▄█ █▀█ █▄█ █░▀█ ░█░ ██▄ █▀▄
";
const CREDIT: &str = "S U B H U N T E R  -  crt.sh subdomain finder";
const RULE_WIDTH: usize = 78;

fn centered(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.chars().count()) / 2;
    format!("{}{}", " ".repeat(padding), text)
}

pub fn display_banner() {
    let rule = format!("  {}", "»".repeat(RULE_WIDTH));
    println!("{}", rule.green());
    for line in ASCII_ART.lines().filter(|line| !line.trim().is_empty()) {
        println!("{}", centered(line.trim(), RULE_WIDTH).green());
    }
    println!("{}", rule.green());
    println!("{}", centered(CREDIT, RULE_WIDTH).green());
    println!();
}

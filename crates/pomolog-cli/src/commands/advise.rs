use pomolog_core::advisory::{classify, Advisory};

pub fn run(memo: &str) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render(&classify(memo)));
    Ok(())
}

pub fn render(advisory: &Advisory) -> String {
    let mut out = String::new();
    for (heading, lines) in [("Do", &advisory.do_lines), ("Don't", &advisory.dont_lines)] {
        if lines.is_empty() {
            continue;
        }
        out.push_str(heading);
        out.push_str(":\n");
        for line in lines {
            out.push_str("  - ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

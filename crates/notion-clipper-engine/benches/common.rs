// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_clipping(size: usize) -> String {
    let base = "# Meeting notes\n\nSome **bold** text with a [link](https://example.com) and `code`.\n\n- Action item\n  - Owner: *Ada*\n- [ ] Follow up\n\n> [!warning] Deadline\n> Friday at noon\n\n| Name | Role |\n|---|---|\n| Ada | Eng |\n\n```python\nprint(\"hello\")\n```\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_nested_list(items: usize, depth: usize) -> String {
    let mut content = String::new();
    for i in 0..items {
        for level in 0..depth {
            content.push_str(&"  ".repeat(level));
            content.push_str(&format!("- Item {i} at level {level}\n"));
        }
    }
    content
}

use std::fs;

fn main() {
    // Validate the built-in styles at compile time
    let styles_path = "src/default_styles.toml";
    println!("cargo:rerun-if-changed={}", styles_path);

    let content = fs::read_to_string(styles_path).expect("Failed to read default_styles.toml");

    // Try to parse it as TOML to catch syntax errors
    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_styles.toml: {}", e),
    };

    // Every entry must be a table of style properties
    for (slot, value) in &table {
        if !value.is_table() {
            panic!("default_styles.toml: `{}` must be a table", slot);
        }
    }
}

use std::fs;

fn main() {
    // The bundled config is parsed at runtime without a fallback path, so
    // reject a broken one here
    let config_path = "src/default_config.toml";
    println!("cargo:rerun-if-changed={config_path}");

    let content = fs::read_to_string(config_path).expect("Failed to read default_config.toml");

    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_config.toml: {e}"),
    };
    for section in ["document", "copy", "answer"] {
        if !table.contains_key(section) {
            panic!("default_config.toml is missing the [{section}] section");
        }
    }
}

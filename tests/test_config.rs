use portico::config::{CONFIG_ENV, Config, LISTEN_ENV};
use std::io::Write;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:9999");
    assert_eq!(cfg.server.max_connections, 64);
    assert_eq!(cfg.static_files.root.to_str(), Some("public"));
    assert_eq!(cfg.static_files.whitelist.len(), 11);
    assert_eq!(cfg.static_files.template_path, "/classic.html");
    assert_eq!(cfg.static_files.placeholder, "{time}");
}

#[test]
fn test_config_partial_yaml_keeps_defaults() {
    let cfg = Config::from_yaml_str("server:\n  max_connections: 8\n").unwrap();

    assert_eq!(cfg.server.max_connections, 8);
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:9999");
    assert_eq!(cfg.static_files.whitelist.len(), 11);
}

#[test]
fn test_config_full_yaml() {
    let raw = r#"
server:
  listen_addr: "0.0.0.0:8080"
  max_connections: 2
static_files:
  root: "site"
  whitelist: ["/a.html", "/b.html"]
  template_path: "/b.html"
  placeholder: "%NOW%"
"#;
    let cfg = Config::from_yaml_str(raw).unwrap();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:8080");
    assert_eq!(cfg.static_files.root.to_str(), Some("site"));
    assert_eq!(cfg.static_files.whitelist, vec!["/a.html", "/b.html"]);
    assert_eq!(cfg.static_files.template_path, "/b.html");
    assert_eq!(cfg.static_files.placeholder, "%NOW%");
}

#[test]
fn test_config_rejects_zero_connections() {
    assert!(Config::from_yaml_str("server:\n  max_connections: 0\n").is_err());
}

#[test]
fn test_config_rejects_relative_whitelist_entry() {
    assert!(Config::from_yaml_str("static_files:\n  whitelist: [\"index.html\"]\n").is_err());
}

#[test]
fn test_config_rejects_bad_yaml() {
    assert!(Config::from_yaml_str("server: [unclosed").is_err());
}

// The only test touching process environment; keep it that way so
// parallel tests cannot observe each other's variables.
#[test]
fn test_config_load_from_env() {
    let path = std::env::temp_dir().join(format!("portico-test-{}.yaml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "server:\n  listen_addr: \"127.0.0.1:7000\"\n  max_connections: 3").unwrap();

    unsafe {
        std::env::set_var(CONFIG_ENV, &path);
        std::env::remove_var(LISTEN_ENV);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:7000");
    assert_eq!(cfg.server.max_connections, 3);

    unsafe {
        std::env::set_var(LISTEN_ENV, "0.0.0.0:5000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "0.0.0.0:5000");
    assert_eq!(cfg.server.max_connections, 3);

    unsafe {
        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var(LISTEN_ENV);
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:9999");

    std::fs::remove_file(&path).unwrap();
}

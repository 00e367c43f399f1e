use std::fs;
use std::path::PathBuf;

use rfsvg::{compose, compose_grid_container, ComposeConfig, MarkupDom};

const DOCUMENT_URL: &str = "http://localhost:8080/render/index.html";

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

fn render_page(page: &str, grid_columns: Option<usize>) -> String {
    let html = fs::read_to_string(format!("tests/goldens/pages/{}", page)).expect("read fixture");
    let mut dom = MarkupDom::parse(&html).with_document_url(DOCUMENT_URL);
    let root = dom.element_by_id("chart").expect("fixture needs #chart");
    let config = ComposeConfig {
        pretty: true,
        ..ComposeConfig::default()
    };
    match grid_columns {
        Some(columns) => compose_grid_container(
            &mut dom,
            root,
            &ComposeConfig {
                columns,
                ..config
            },
        ),
        None => compose(&mut dom, &[root], &config),
    }
    .expect("compose fixture")
}

fn check_golden(name: &str, actual: &str) {
    let expected_path = golden_path(name);
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, actual).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    let exp = fs::read_to_string(&expected_path).unwrap_or_else(|e| {
        panic!(
            "no golden at {:?} ({}); run with UPDATE_GOLDENS=1 to create it",
            expected_path, e
        )
    });
    assert_eq!(actual, exp, "golden mismatch for {}", name);
}

#[test]
fn golden_penguins_figure() {
    let svg = render_page("penguins.html", None);
    assert_eq!(svg, render_page("penguins.html", None), "output must be deterministic");
    assert!(svg.contains(r##"clip-path="url(#plot-clip-1)""##));
    assert!(svg.contains("flipper_length_mm &amp; body_mass_g"));
    check_golden("penguins.svg", &svg);
}

#[test]
fn golden_region_grid() {
    let svg = render_page("grid.html", Some(2));
    assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="480" height="348""#));
    assert_eq!(svg.matches("<text ").count(), 4);
    check_golden("grid.svg", &svg);
}

use stache::{Mustache, Template, TemplateFolder, TemplateStore, MapsAndLists};

use std::{fs, sync::Arc, thread};
use pretty_assertions::assert_eq;
use serde::Serialize;


#[derive(Serialize)]
struct Item {
    name: &'static str,
    price: f64,
}

#[derive(Serialize)]
struct Order {
    customer: &'static str,
    items: Vec<Item>,
    paid: bool,
}

fn order() -> Order {
    Order {
        customer: "Ann",
        items: vec![
            Item { name: "tea", price: 2.5 },
            Item { name: "cake", price: 4.0 },
        ],
        paid: false,
    }
}

#[test]
fn render_serializable_data() {
    let engine = Mustache::from(
        "{{customer}}:\n{{#items}}\n- {{name}} {{price}}\n{{/items}}\n{{^paid}}unpaid\n{{/paid}}"
    ).unwrap();
    assert_eq!(engine.render(&order()), "Ann:\n- tea 2.5\n- cake 4.0\nunpaid\n");
}

#[test]
fn folder_store_reads_partials() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("item.mustache"), "- {{name}}\n").unwrap();
    let engine = Mustache::from("{{#items}}\n  {{>item}}\n{{/items}}\n")
        .unwrap()
        .with_partials(TemplateFolder::new(dir.path()));
    assert_eq!(engine.render(&order()), "  - tea\n  - cake\n");
}

#[test]
fn folder_store_caches_until_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("p.html");
    fs::write(&file, "first").unwrap();
    let store = TemplateFolder::with_extension(dir.path(), "html");
    let template = Template::from("{{>p}}").unwrap();
    let data = serde_json::json!({});

    assert_eq!(template.render_with_partials(&data, &store), "first");
    fs::write(&file, "second").unwrap();
    assert_eq!(template.render_with_partials(&data, &store), "first");
    store.clear_cache();
    assert_eq!(template.render_with_partials(&data, &store), "second");
}

#[test]
fn folder_store_without_extension() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("raw"), "raw partial").unwrap();
    let store = TemplateFolder::with_extension(dir.path(), "");
    assert_eq!(store.get("raw").unwrap().render(&serde_json::json!({})), "raw partial");
}

#[test]
fn folder_store_ignores_missing_and_ill_formed_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.mustache"), "{{#open}}").unwrap();
    let engine = Mustache::from("[{{>bad}}][{{>missing}}]")
        .unwrap()
        .with_partials(TemplateFolder::new(dir.path()));
    assert_eq!(engine.render(&serde_json::json!({})), "[][]");
}

#[test]
fn folder_store_keeps_dynamic_names_inside_folder() {
    let dir = tempfile::tempdir().unwrap();
    let partials = dir.path().join("partials");
    fs::create_dir(&partials).unwrap();
    fs::write(dir.path().join("secret"), "secret").unwrap();
    fs::write(partials.join("shown"), "shown").unwrap();
    let engine = Mustache::from("[{{>*name}}]")
        .unwrap()
        .with_partials(TemplateFolder::with_extension(&partials, ""));
    assert_eq!(engine.render(&serde_json::json!({ "name": "shown" })), "[shown]");
    assert_eq!(engine.render(&serde_json::json!({ "name": "../secret" })), "[]");
    let absolute = dir.path().join("secret").display().to_string();
    assert_eq!(engine.render(&serde_json::json!({ "name": absolute })), "[]");
}

#[test]
fn closure_store() {
    let header = Arc::new(Template::from("<h1>{{title}}</h1>").unwrap());
    let engine = Mustache::from("{{>header}}{{>footer}}")
        .unwrap()
        .with_partials(move |name: &str| match name {
            "header" => Some(Arc::clone(&header)),
            _ => None,
        });
    let data = serde_json::json!({ "title": "Home" });
    assert_eq!(engine.render(&data), "<h1>Home</h1>");
}

#[test]
fn render_custom_context() {
    let data = [
        ("user", MapsAndLists::text("ann")),
        ("shout", MapsAndLists::lambda1(|body| body.to_uppercase())),
    ].into_iter().collect::<MapsAndLists>();
    let engine = Mustache::from("{{#shout}}hi {{/shout}}{{user}}").unwrap();
    assert_eq!(engine.render_context(&data), "HI ann");
}

#[test]
fn templates_render_concurrently() {
    let template = Arc::new(Template::from("{{#n}}{{.}}{{/n}}").unwrap());
    let handles = (0..4)
        .map(|i| {
            let template = Arc::clone(&template);
            thread::spawn(move || {
                template.render(&serde_json::json!({ "n": [i, i] }))
            })
        })
        .collect::<Vec<_>>();
    let results = handles.into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(results, vec!["00", "11", "22", "33"]);
}

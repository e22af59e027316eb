//! End-to-end scenarios across schema, containers, rendering and XML.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use wiki_objects::{
    ClassDefinition, Container, Context, DiffAction, DisplayMode, FieldDescriptor, FieldType,
    InMemoryRegistry, ObjectDiff, ObjectError,
};

fn post_class() -> ClassDefinition {
    ClassDefinition::new("Blog.PostClass")
        .with_field(FieldDescriptor::new("title", "Title", FieldType::String))
        .with_field(FieldDescriptor::new("count", "Count", FieldType::Integer))
        .with_field(FieldDescriptor::new("tag", "Tag", FieldType::String))
        .with_field(
            FieldDescriptor::new("categories", "Categories", FieldType::List)
                .with_list_values(["News", "Rust", "Wiki"]),
        )
}

#[test]
fn test_diff_reports_changed_and_removed() {
    let registry = InMemoryRegistry::new().with_class(post_class());
    let ctx = Context::new(&registry);

    let mut a = Container::new("Blog.PostClass");
    a.set_string_value("title", "Hello");
    a.set_int_value("count", 3);

    let mut b = Container::new("Blog.PostClass");
    b.set_string_value("title", "Hello");
    b.set_int_value("count", 5);
    b.set_string_value("tag", "x");

    assert_eq!(
        a.diff(&b, &ctx),
        vec![
            ObjectDiff::new("Blog.PostClass", 0, DiffAction::Changed, "count", "3", "5"),
            ObjectDiff::new("Blog.PostClass", 0, DiffAction::Removed, "tag", "", "x"),
        ]
    );

    // Same result without a schema: values fall back to their raw text.
    assert_eq!(a.diff(&b, &Context::detached()), a.diff(&b, &ctx));
}

#[test]
fn test_empty_container_defaults() {
    let c = Container::new("Blog.PostClass");
    assert_eq!(c.int_value("count"), 0);
    assert_eq!(c.string_value("title"), "");
    assert_eq!(c.date_value("posted"), None);
    assert!(c.is_empty());
    assert!(c.to_value_map().is_empty());
}

#[test]
fn test_form_edit_cycle() {
    let registry = InMemoryRegistry::new().with_class(post_class());
    let ctx = Context::new(&registry);
    let class = ctx.resolve_class("Blog.PostClass").unwrap();

    let mut post = class.new_object("Blog.Hello", 1);
    post.set_string_value("title", "Hello");
    post.set_int_value("count", 3);

    // The rendered inputs name the fields the way read_form expects them.
    let hidden = post.display("count", DisplayMode::Hidden, &ctx);
    assert_eq!(hidden, "<input type=\"hidden\" name=\"Blog.PostClass_1_count\" value=\"3\"/>");

    let mut form: HashMap<String, Vec<String>> = HashMap::new();
    form.insert("Blog.PostClass_1_count".into(), vec!["4".into()]);
    form.insert("Blog.PostClass_1_categories".into(), vec!["Rust".into(), "Wiki".into()]);
    let mut edited = post.clone();
    class.read_form(&post.form_prefix(), &form, &mut edited);

    assert_eq!(edited.int_value("count"), 4);
    assert_eq!(
        edited.display("categories", DisplayMode::Edit, &ctx),
        "<select name=\"Blog.PostClass_1_categories\" multiple=\"multiple\" size=\"3\">\
         <option value=\"News\">News</option>\
         <option value=\"Rust\" selected=\"selected\">Rust</option>\
         <option value=\"Wiki\" selected=\"selected\">Wiki</option>\
         </select>"
    );

    let diffs: Vec<(DiffAction, String)> = post
        .diff(&edited, &ctx)
        .into_iter()
        .map(|d| (d.action(), d.field_name().to_string()))
        .collect();
    assert_eq!(
        diffs,
        vec![
            (DiffAction::Changed, "count".to_string()),
            (DiffAction::Removed, "categories".to_string()),
        ]
    );
}

#[test]
fn test_strict_validation_rejects_undeclared() {
    let registry = InMemoryRegistry::new().with_class(post_class());
    let strict = Context::new(&registry).with_strict_field_validation(true);
    let mut c = Container::new("Blog.PostClass");

    let ghost = FieldDescriptor::new("ghost", "Ghost", FieldType::String).from_value("boo");
    let err = c.put("ghost", ghost, &strict).unwrap_err();
    assert_eq!(
        err,
        ObjectError::FieldNotDeclared {
            field: "ghost".to_string(),
            class: "Blog.PostClass".to_string(),
        }
    );
    assert_eq!(err.to_string(), "field \"ghost\" does not exist in class \"Blog.PostClass\"");
    assert!(c.is_empty());
}

#[test]
fn test_schema_and_object_documents() {
    let class_xml = post_class().to_xml_string().unwrap();
    let class = ClassDefinition::from_xml_str(&class_xml).unwrap();
    assert_eq!(class, post_class());

    let registry = InMemoryRegistry::new().with_class(class);
    let ctx = Context::new(&registry);

    let object_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<object>
  <className>Blog.PostClass</className>
  <name>Blog.Hello</name>
  <number>0</number>
  <property>
    <title>Hello</title>
  </property>
  <property>
    <count> 12 </count>
  </property>
  <property>
    <categories>
      <value>Wiki</value>
      <value>News</value>
    </categories>
  </property>
</object>"#;
    let object = Container::from_xml_str(object_xml, &ctx).unwrap();
    assert_eq!(object.field_names().collect::<Vec<_>>(), vec!["title", "count", "categories"]);
    assert_eq!(object.int_value("count"), 12);
    assert_eq!(object.display("categories", DisplayMode::View, &ctx), "News Wiki");

    let rewritten = object.to_xml_string();
    assert_eq!(Container::from_xml_str(&rewritten, &ctx).unwrap(), object);
}

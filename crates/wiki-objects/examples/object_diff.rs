//! Prints the field-level diff between two object XML files.
//!
//! ```text
//! cargo run --example object_diff -- class.xml old.xml new.xml
//! ```
//!
//! Without arguments a built-in pair of blog posts is compared. Set
//! `RUST_LOG=wiki_objects=debug` to see skipped fields and lookup failures.

use std::fs;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wiki_objects::{
    format_id, ClassDefinition, Container, Context, DisplayMode, FieldDescriptor, FieldType,
    InMemoryRegistry,
};

fn builtin() -> (ClassDefinition, Container, Container) {
    let class = ClassDefinition::new("Blog.PostClass")
        .with_field(FieldDescriptor::new("title", "Title", FieldType::String))
        .with_field(FieldDescriptor::new("count", "Count", FieldType::Integer))
        .with_field(FieldDescriptor::new("tag", "Tag", FieldType::String));

    let mut old = class.new_object("Blog.Hello", 0);
    old.set_string_value("title", "Hello");
    old.set_int_value("count", 3);

    let mut new = old.clone();
    new.set_int_value("count", 5);
    new.set_string_value("tag", "x");

    (class, old, new)
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (class, old, new) = match args.as_slice() {
        [class, old, new] => {
            let class = fs::read_to_string(class).expect("Failed to read class");
            let class = ClassDefinition::from_xml_str(&class).expect("Failed to decode class");
            let registry = InMemoryRegistry::new().with_class(class.clone());
            let ctx = Context::new(&registry);
            let old = fs::read_to_string(old).expect("Failed to read object");
            let old = Container::from_xml_str(&old, &ctx).expect("Failed to decode object");
            let new = fs::read_to_string(new).expect("Failed to read object");
            let new = Container::from_xml_str(&new, &ctx).expect("Failed to decode object");
            (class, old, new)
        }
        [] => builtin(),
        _ => {
            eprintln!("usage: object_diff [CLASS.xml OLD.xml NEW.xml]");
            std::process::exit(2);
        }
    };

    let registry = InMemoryRegistry::new().with_class(class);
    let ctx = Context::new(&registry);

    println!("=== Object ===");
    println!("Class:  {}", old.class_name());
    println!("Page:   {}", old.name());
    println!("Number: {}", old.number());
    println!("ID:     {}", format_id(&old.id()));

    println!("\n=== Fields ===");
    for name in old.field_names() {
        println!("{:<12} {}", name, old.display(name, DisplayMode::View, &ctx));
    }

    let diffs = old.diff(&new, &ctx);
    println!("\n=== Diff ({} entries) ===", diffs.len());
    for diff in &diffs {
        println!(
            "{:<8} {:<12} {:?} -> {:?}",
            diff.action().as_str(),
            diff.field_name(),
            diff.old_value(),
            diff.new_value()
        );
    }
}

//! Basic Validation Example
//!
//! This example validates a nested model against a rule table and prints the
//! resulting tree.
//!
//! Run with:
//! ```bash
//! cargo run -p ouroboros-constraints --example basic_validation
//! ```

use ouroboros_constraints::{
    constraints, ConfigResult, MapRegistry, RawParams, ResultNode, RuleTable, ValidateOptions,
    Validator, Value,
};

// ============================================================================
// Model and Rules
// ============================================================================

fn rules() -> RuleTable {
    RuleTable::new("Owner")
        .rule("Owner", "name", constraints!["required", "nospaces"])
        .rule("Owner", "email", constraints!["email"])
        .typed_rule("Owner", "address", "Address", constraints!["required"])
        .typed_rule(
            "Owner",
            "pets",
            "Pet[]",
            constraints![("length", RawParams::new().set("min", 1).set("max", 3))],
        )
        .rule("Address", "street", constraints![("length", RawParams::new().set("min", 2))])
        .rule(
            "Address",
            "zip",
            constraints![("pattern", RawParams::new().set("re", r"^\d{5}$").group("shipping"))],
        )
        .rule("Pet", "name", constraints!["required"])
        .rule("Pet", "age", constraints![("range", RawParams::new().set("min", 0).set("max", 40))])
}

fn model() -> Value {
    Value::object([
        ("name", Value::from("John Smith")),
        ("email", Value::from("john@example.com")),
        (
            "address",
            Value::object([("street", Value::from("X")), ("zip", Value::from("1234"))]),
        ),
        (
            "pets",
            Value::list([
                Value::object([("name", Value::from("Rex")), ("age", Value::Int(3))]),
                Value::object([("name", Value::from("")), ("age", Value::Int(52))]),
            ]),
        ),
    ])
}

// ============================================================================
// Helper Functions
// ============================================================================

fn print_node(label: &str, node: &ResultNode, indent: usize) {
    let status = if node.has_validation_errors() { "INVALID" } else { "OK" };
    println!("{:indent$}{}: {}", "", label, status, indent = indent);

    if let Some(validity) = node.validity() {
        for (key, result) in validity {
            if !result.is_valid {
                let message = result.message.as_deref().unwrap_or("invalid");
                println!("{:indent$}  ! {}: {}", "", key, message, indent = indent);
            }
        }
    }
    if let Some(children) = node.children() {
        for (segment, child) in children.iter() {
            print_node(&segment.to_string(), child, indent + 2);
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ConfigResult<()> {
    println!("Basic Validation Example");
    println!("========================\n");

    let validator = Validator::new(MapRegistry::with_builtins(), rules().into_introspector());
    let model = model();

    println!("1. Full validation (default group)");
    println!("----------------------------------");
    let vctx = validator.validate(&model, &ValidateOptions::new())?;
    print_node("<root>", vctx.result(), 2);
    println!();

    println!("2. Shipping group only");
    println!("----------------------");
    let vctx = validator.validate(&model, &ValidateOptions::new().groups(["shipping"]))?;
    print_node("<root>", vctx.result(), 2);
    println!();

    println!("3. Eager mode");
    println!("-------------");
    let vctx = validator.validate(&model, &ValidateOptions::new().eager(true))?;
    print_node("<root>", vctx.result(), 2);
    println!();

    println!("4. Only the pets property");
    println!("-------------------------");
    let vctx = validator.validate(&model, &ValidateOptions::new().props(["pets"]))?;
    print_node("<root>", vctx.result(), 2);
    println!();

    println!("Summary:");
    println!("  - RuleTable declares constraints per type and property");
    println!("  - validate() returns a context whose result tree mirrors the model");
    println!("  - Groups, eager mode and property filters narrow a run");
    Ok(())
}

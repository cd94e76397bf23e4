//! Custom Validators Example
//!
//! This example registers custom validators, gates one behind a condition,
//! reads ancestors from the validation context and validates a single field.
//!
//! Run with:
//! ```bash
//! cargo run -p ouroboros-constraints --example custom_validators
//! ```

use ouroboros_constraints::{
    constraints, ConfigResult, MapRegistry, RawParams, TaggedTypes, ValidateOptions, Validator,
    Value,
};

fn registry() -> MapRegistry {
    let mut registry = MapRegistry::with_builtins();

    // Cross-field check against the object holding the field
    registry.register("matches_password", |owner, value, _params, vctx| {
        let valid = value == owner.get("password");
        if !valid {
            vctx.set_message("Passwords do not match");
        }
        Some(valid)
    });

    // parent(0) is the pet, parent(1) the list holding it
    registry.register("unique_in_list", |_owner, value, _params, vctx| {
        let list = vctx.parent(1).ok()?.value?;
        let name = value?;
        let count = match list {
            Value::List(items) => items.iter().filter(|item| item.get("name") == Some(name)).count(),
            _ => return None,
        };
        if count > 1 {
            vctx.set_message(format!("Duplicate name {:?}", name.as_str().unwrap_or_default()));
        }
        Some(count <= 1)
    });

    registry
}

fn demonstrate_cross_field() -> ConfigResult<()> {
    println!("1. Cross-field validation");
    println!("-------------------------");

    let types = TaggedTypes::new()
        .rule("signup", "password", constraints![("length", RawParams::new().set("min", 8))])
        .rule("signup", "confirm", constraints!["matches_password"]);
    let validator = Validator::new(registry(), types.into_introspector());

    let signup = Value::object([
        ("type", Value::from("signup")),
        ("password", Value::from("hunter22")),
        ("confirm", Value::from("hunter23")),
    ]);
    let vctx = validator.validate(&signup, &ValidateOptions::new())?;
    let confirm = vctx.result().child("confirm");
    let result = confirm.and_then(|node| node.result_for("matches_password"));
    println!("  confirm: {:?}\n", result.and_then(|r| r.message.as_deref()));
    Ok(())
}

fn demonstrate_ancestors() -> ConfigResult<()> {
    println!("2. Reading ancestors");
    println!("--------------------");

    let types = TaggedTypes::new().rule("pet", "name", constraints!["required", "unique_in_list"]);
    let validator = Validator::new(registry(), types.into_introspector());

    let pet = |name: &str| Value::object([("type", Value::from("pet")), ("name", Value::from(name))]);
    let pets = Value::list([pet("Rex"), pet("Fido"), pet("Rex")]);
    let vctx = validator.validate(&pets, &ValidateOptions::new())?;

    if let Some(children) = vctx.result().children() {
        for (index, node) in children.iter() {
            let status = if node.has_validation_errors() { "INVALID" } else { "OK" };
            println!("  pets[{}]: {}", index, status);
        }
    }
    println!();
    Ok(())
}

fn demonstrate_condition() -> ConfigResult<()> {
    println!("3. Conditional constraints");
    println!("--------------------------");

    let shipped = |owner: &Value| owner.get("shipped").and_then(Value::as_bool);
    let types = TaggedTypes::new().rule(
        "order",
        "tracking",
        constraints![("required", RawParams::new().condition(move |owner, _, _, _| shipped(owner)))],
    );
    let validator = Validator::new(registry(), types.into_introspector());

    for is_shipped in [false, true] {
        let order = Value::object([("type", Value::from("order")), ("shipped", Value::Bool(is_shipped))]);
        let vctx = validator.validate(&order, &ValidateOptions::new())?;
        println!(
            "  shipped={}, no tracking number: {}",
            is_shipped,
            if vctx.has_validation_errors() { "INVALID" } else { "OK" }
        );
    }
    println!();
    Ok(())
}

fn demonstrate_single_field() -> ConfigResult<()> {
    println!("4. Single field validation");
    println!("--------------------------");

    let validator = Validator::new(registry(), TaggedTypes::new().into_introspector());
    let email = constraints!["required", "email"];
    let form = Value::object([("email", Value::from("not-an-email"))]);

    let vctx = validator.validate_field(&form, "email", &email, &ValidateOptions::new())?;
    let node = vctx.result().child("email");
    println!(
        "  email: {:?}\n",
        node.and_then(|n| n.result_for("email")).and_then(|r| r.message.as_deref())
    );
    Ok(())
}

fn main() -> ConfigResult<()> {
    println!("Custom Validators Example");
    println!("=========================\n");

    demonstrate_cross_field()?;
    demonstrate_ancestors()?;
    demonstrate_condition()?;
    demonstrate_single_field()?;

    println!("Summary:");
    println!("  - Validators receive the owning object, the value, params and the context");
    println!("  - Messages set on the context end up in the recorded result");
    println!("  - vctx.parent(n) walks up the model path");
    println!("  - A condition returning Some(false) skips the validator");
    Ok(())
}

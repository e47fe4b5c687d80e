use std::fs::File;

use formwork::prelude::*;
use regex::Regex;
use simplelog::{Config, LevelFilter, WriteLogger};

fn non_blank() -> Validator<String, String> {
    validator::non_blank("Value should be a non-blank string!")
}

fn signup_schema(values: &Values) -> ValidationSchema {
    let password = values.get_as::<String>("password").unwrap_or_default();
    let has_digit = Regex::new(r"\d").expect("valid regex");

    ValidationSchema::new()
        .field(
            "name",
            non_blank().chain(validator::length_range(
                4,
                64,
                "User name length must be between 4 and 64 chars!",
            )),
        )
        .field_with(
            "email",
            ValidationStrategy::OnBlur,
            non_blank().chain(validator::email("Invalid email address!")),
        )
        .field(
            "password",
            formwork::sequence!(
                non_blank(),
                formwork::parallel![
                    validator::length_range(
                        8,
                        64,
                        "Password length must be between 8 and 64 chars!"
                    ),
                    validator::pattern(has_digit, "Password must contain at least 1 digit!"),
                ],
            ),
        )
        .field_with(
            "confirm_password",
            ValidationStrategy::OnChange,
            non_blank().chain(validator::equals(password, "Passwords do not match!")),
        )
        .skip("newsletter")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    let log_file = File::create("signup.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let form = Form::new(
        FormConfig::new(
            Values::new()
                .with("name", "")
                .with("email", "")
                .with("password", "")
                .with("confirm_password", "")
                .with("newsletter", false),
        )
        .validators(signup_schema),
    );

    // Simulate the user filling in the form.
    let fields = form.fields();
    for (key, value) in [
        ("name", "Ada"),
        ("email", "ada@example"),
        ("password", "analytical1"),
        ("confirm_password", "analytical"),
    ] {
        if let Some(props) = fields.get(key) {
            if let Some(task) = props.on_change(value) {
                task.await.ok();
            }
            if let Some(task) = props.on_blur() {
                task.await.ok();
            }
        }
    }

    let submit = SubmitHandler::new(|values: Values| async move {
        println!("submitted: {}", serde_json::to_string(&values)?);
        Ok::<_, serde_json::Error>(())
    })
    .on_failure(|errors: &FormErrors| {
        for (key, messages) in errors.iter() {
            if let Some(messages) = messages {
                println!("{key}: {messages}");
            }
        }
    });

    if let SubmitOutcome::Invalid(_) = form.handle_submit(submit).await {
        form.set_values(|values| {
            values
                .with("name", "Ada Lovelace")
                .with("email", "ada@example.com")
                .with("confirm_password", "analytical1")
        });
        let retry = SubmitHandler::new(|values: Values| async move {
            println!("submitted: {}", serde_json::to_string(&values)?);
            Ok::<_, serde_json::Error>(())
        });
        let outcome = form.handle_submit(retry).await;
        println!("retry submitted: {}", outcome.is_submitted());
    }

    Ok(())
}

use std::borrow::Cow;
use stencil_derive::stencil_error;

#[stencil_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Feature '{feature_id}' failed{}: {source}", format_context(.context))]
    Feature { feature_id: String, source: std::fmt::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    Err::<(), _>(std::io::Error::other("disk gone")).context("Reading manifest")?;
    Ok(())
}

fn fail() -> Result<(), DemoError> {
    Err("boom".into())
}

fn main() {
    let err = read().unwrap_err();
    assert!(matches!(err, DemoError::Io { context: Some(_), .. }));

    let err = fail().context("While composing").unwrap_err();
    assert_eq!(err.to_string(), "Internal error (While composing): boom");

    let err = DemoError::Feature {
        feature_id: "api-rest".into(),
        source: std::fmt::Error,
        context: None,
    };
    assert!(err.to_string().starts_with("Feature 'api-rest' failed"));
}

#[test]
fn stencil_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/stencil_error_pass.rs");
}

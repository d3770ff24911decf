//! Then step definitions

use crate::steps::docstring;
use crate::world::ApiWorld;
use cucumber::{gherkin::Step, then};

#[then(regex = r"^(?:the )?response code should be (\d+)$")]
async fn response_code(world: &mut ApiWorld, code: u16) -> anyhow::Result<()> {
    world.context.response_code_should_be(code)?;
    Ok(())
}

#[then(regex = r#"^(?:the )?response should contain "([^"]*)"$"#)]
async fn response_contains(world: &mut ApiWorld, text: String) -> anyhow::Result<()> {
    world.context.response_should_contain(&text)?;
    Ok(())
}

#[then(regex = r#"^(?:the )?response should not contain "([^"]*)"$"#)]
async fn response_not_contains(world: &mut ApiWorld, text: String) -> anyhow::Result<()> {
    world.context.response_should_not_contain(&text)?;
    Ok(())
}

#[then(regex = r"^(?:the )?response should contain json:$")]
async fn response_contains_json(world: &mut ApiWorld, step: &Step) -> anyhow::Result<()> {
    world.context.response_should_contain_json(docstring(step)?)?;
    Ok(())
}

#[then(regex = r"^(?:the )?response should contain json matching:$")]
async fn response_contains_json_matching(
    world: &mut ApiWorld,
    step: &Step,
) -> anyhow::Result<()> {
    world
        .context
        .response_should_contain_json_matching(docstring(step)?)?;
    Ok(())
}

#[then(regex = r#"^(?:the )?response should contain json with key "([^"]*)" matching:$"#)]
async fn response_contains_json_with_key_matching(
    world: &mut ApiWorld,
    key: String,
    step: &Step,
) -> anyhow::Result<()> {
    world
        .context
        .response_should_contain_json_with_key_matching(&key, docstring(step)?)?;
    Ok(())
}

#[then("the response should be json")]
async fn response_is_json(world: &mut ApiWorld) -> anyhow::Result<()> {
    world.context.response_should_be_json()?;
    Ok(())
}

#[then("print response")]
async fn print_response(world: &mut ApiWorld) -> anyhow::Result<()> {
    println!("{}", world.context.describe_response()?);
    Ok(())
}

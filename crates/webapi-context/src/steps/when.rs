//! When step definitions

use crate::steps::{docstring, table_rows};
use crate::world::ApiWorld;
use cucumber::{gherkin::Step, when};

#[when(regex = r#"^(?:I )?send a ([A-Z]+) request to "([^"]+)"$"#)]
async fn send_request(world: &mut ApiWorld, method: String, url: String) -> anyhow::Result<()> {
    world.context.send_request(&method, &url).await?;
    Ok(())
}

#[when(regex = r#"^(?:I )?send a ([A-Z]+) request to "([^"]+)" with values:$"#)]
async fn send_request_with_values(
    world: &mut ApiWorld,
    method: String,
    url: String,
    step: &Step,
) -> anyhow::Result<()> {
    let rows = table_rows(step)?;
    world
        .context
        .send_request_with_values(&method, &url, &rows)
        .await?;
    Ok(())
}

#[when(regex = r#"^(?:I )?send a ([A-Z]+) request to "([^"]+)" with body:$"#)]
async fn send_request_with_body(
    world: &mut ApiWorld,
    method: String,
    url: String,
    step: &Step,
) -> anyhow::Result<()> {
    let body = docstring(step)?;
    world
        .context
        .send_request_with_body(&method, &url, body)
        .await?;
    Ok(())
}

#[when(regex = r#"^(?:I )?send a ([A-Z]+) request to "([^"]+)" with form data:$"#)]
async fn send_request_with_form_data(
    world: &mut ApiWorld,
    method: String,
    url: String,
    step: &Step,
) -> anyhow::Result<()> {
    let body = docstring(step)?;
    world
        .context
        .send_request_with_form_data(&method, &url, body)
        .await?;
    Ok(())
}

use stevedore_core::ImageRef;
use stevedore_docker::DockerClient;

use super::image::resolve_image;
use super::{Context, deps};

pub async fn build(ctx: &Context) -> anyhow::Result<()> {
    let image = resolve_image(ctx).await?;
    build_image(ctx, &DockerClient::new(), &image).await
}

/// Build, then push the same image reference.
pub async fn push(ctx: &Context) -> anyhow::Result<()> {
    let image = resolve_image(ctx).await?;
    let client = DockerClient::new();

    build_image(ctx, &client, &image).await?;
    client.push(&image).await?;

    println!("Pushed: {image}");
    Ok(())
}

pub async fn up(ctx: &Context) -> anyhow::Result<()> {
    deps::sync(ctx)?;
    DockerClient::new().compose_up().await?;
    Ok(())
}

async fn build_image(
    ctx: &Context,
    client: &DockerClient,
    image: &ImageRef,
) -> anyhow::Result<()> {
    deps::sync(ctx)?;
    client.build(image).await?;
    Ok(())
}

use stevedore_core::ImageRef;
use stevedore_docker::GitClient;

use super::Context;

/// `<repo>:<tag>`, with the tag taken from `DOCKER_TAG` or derived from git.
pub(crate) async fn resolve_image(ctx: &Context) -> anyhow::Result<ImageRef> {
    let tag = resolve_tag(ctx).await?;
    Ok(ImageRef::new(ctx.settings.repo.as_str(), tag)?)
}

pub(crate) async fn resolve_tag(ctx: &Context) -> anyhow::Result<String> {
    let git = GitClient::new();
    Ok(git
        .resolve_tag(ctx.settings.tag_override.as_deref())
        .await?)
}

pub async fn get_tag(ctx: &Context) -> anyhow::Result<()> {
    println!("{}", resolve_tag(ctx).await?);
    Ok(())
}

pub async fn get_img(ctx: &Context) -> anyhow::Result<()> {
    println!("{}", resolve_image(ctx).await?);
    Ok(())
}

pub fn get_repo(ctx: &Context) {
    println!("{}", ctx.settings.repo);
}

use stevedore_docker::DockerClient;

use super::Context;
use super::image::resolve_tag;

/// Deploy the compose stack to the configured docker-machine.
pub async fn deploy(ctx: &Context) -> anyhow::Result<()> {
    let machine = &ctx.settings.machine.name;
    let target = &ctx.settings.deploy;
    let client = DockerClient::new();

    client.require_machine(machine).await?;
    let tag = resolve_tag(ctx).await?;
    client.stack_deploy(machine, target, &tag).await?;

    println!(
        "Deployed {tag} to stack '{}' on {machine}",
        target.stack_name
    );
    Ok(())
}

/// Provision the deployment machine on an existing host.
pub async fn create_deploy(ctx: &Context) -> anyhow::Result<()> {
    let machine = &ctx.settings.machine;
    let ip = machine.require_ip()?;

    println!(
        "Creating Docker-Machine with IP: {ip}, Name: {}, SSH Key: {}, SSH User: {}",
        machine.name, machine.ssh_key, machine.ssh_user
    );

    DockerClient::new().create_machine(machine).await?;
    Ok(())
}

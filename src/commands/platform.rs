// Platform command for showing detected host facts

use crate::platform::PlatformSpec;
use crate::ui;

pub fn platform() -> anyhow::Result<()> {
    let platform = PlatformSpec::detect()?;

    ui::status("os:", &platform.os_name);
    ui::status("bits:", &platform.bits.to_string());
    ui::status("platform spec:", &platform.platform_spec);
    match (&platform.os_dist_name, &platform.os_dist_version) {
        (Some(name), Some(version)) => {
            ui::status("distribution:", &format!("{} {}", name, version))
        }
        _ => ui::dim("distribution: unknown"),
    }
    Ok(())
}

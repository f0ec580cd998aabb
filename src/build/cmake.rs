//! Native driver build: CMake configure + ninja

use crate::core::config::Arch;
use crate::core::error::ReleaseResult;
use crate::core::exec::run_tool;
use std::path::Path;
use std::process::Command;

/// Targets built after the driver itself, for the tool archives
pub const TOOL_TARGETS: [&str; 2] = ["amdllpc", "spvgen"];

/// Arguments for the configure step, relative to the xgl checkout
pub fn configure_args(arch: Arch) -> Vec<String> {
  let mut args = vec![
    "-G".to_string(),
    "Ninja".to_string(),
    "-S".to_string(),
    ".".to_string(),
    "-B".to_string(),
    arch.build_dir().to_string(),
    "-DCMAKE_BUILD_TYPE=Release".to_string(),
    "-DBUILD_WAYLAND_SUPPORT=ON".to_string(),
  ];
  if arch == Arch::I386 {
    args.push("-DCMAKE_C_FLAGS=-m32".to_string());
    args.push("-DCMAKE_CXX_FLAGS=-m32".to_string());
  }
  args
}

/// Configure and build the driver plus the tool targets for one architecture
///
/// Output lands in `<xgl_dir>/rbuild64` or `<xgl_dir>/rbuild32`.
pub fn build_driver(xgl_dir: &Path, arch: Arch) -> ReleaseResult<()> {
  println!("   Building driver ({})...", arch.as_str());

  run_tool(Command::new("cmake").current_dir(xgl_dir).args(configure_args(arch)))?;
  run_tool(Command::new("ninja").current_dir(xgl_dir).args(["-C", arch.build_dir()]))?;
  run_tool(
    Command::new("ninja")
      .current_dir(xgl_dir)
      .args(["-C", arch.build_dir()])
      .args(TOOL_TARGETS),
  )?;

  Ok(())
}

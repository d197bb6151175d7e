use modbuild_lib::consts::APP_NAME;
use modbuild_lib::platform::Platform;

pub fn cmd_info() {
  println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
  println!("System:");
  match Platform::current() {
    Some(platform) => println!("Platform: {}", platform.triple()),
    _ => println!("Could not detect platform."),
  }
}

pub mod console;
pub mod install;
pub mod maintenance;
pub mod refresh;
pub mod shop_host;

use crate::application::assets::context::AssetContext;
use crate::application::use_cases::shop_host::{resolve_db_settings, ShopHostUseCase};
use crate::common::SwagResult;
use crate::domain::value_objects::ConsoleFlags;

/// Failures of the console wrappers are logged, never propagated
fn warn_on_error<T>(task: &str, result: SwagResult<T>) -> SwagResult<()> {
    if let Err(e) = result {
        tracing::warn!(task, error = %e, "shopware task failed");
    }
    Ok(())
}

/// Point the shop at the configured host
pub async fn sw_host(ctx: &AssetContext) -> SwagResult<()> {
    let db = resolve_db_settings(&ctx.settings, &ctx.docroot);
    let shop_host = ShopHostUseCase::new(ctx.runner(), db, ctx.settings.shop.clone());
    warn_on_error("sw:host", shop_host.set_host(ctx.host()).await)
}

/// Dump the theme configuration to `web/cache/config_<shop>.json`
pub async fn sw_config(ctx: &AssetContext) -> SwagResult<()> {
    warn_on_error(
        "sw:config",
        ctx.php(&["sw:theme:dump:configuration"], ConsoleFlags::new()).await,
    )
}

pub async fn sw_compile(ctx: &AssetContext) -> SwagResult<()> {
    warn_on_error(
        "sw:compile",
        ctx.php(&["sw:theme:cache:generate"], ConsoleFlags::new()).await,
    )
}

pub async fn sw_clear_cache(ctx: &AssetContext) -> SwagResult<()> {
    let flags = ConsoleFlags::new().with("env", ctx.settings.env.as_str());
    warn_on_error("sw:cl", ctx.php(&["sw:cache:clear"], flags).await)
}

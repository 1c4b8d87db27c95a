//! Theme asset pipeline
//!
//! Every task works on an [`AssetContext`] and is registered by name in the
//! [`TaskGraph`] returned from [`standard_graph`].

pub mod clean;
pub mod context;
pub mod dirs;
pub mod graph;
pub mod images;
pub mod regression;
pub mod rev;
pub mod scripts;
pub mod service_worker;
pub mod shopware;
pub mod styles;

use std::sync::Arc;

pub use context::AssetContext;
pub use dirs::ThemeDirs;
pub use graph::TaskGraph;

use regression::BackstopCommand;

/// Every asset task with its composites
pub fn standard_graph() -> TaskGraph<AssetContext> {
    let mut graph = TaskGraph::new();

    graph
        .action("sw:host", "Point the shop at the configured host", |ctx: Arc<AssetContext>| async move {
            shopware::sw_host(&ctx).await
        })
        .action("sw:config", "Dump the theme configuration", |ctx: Arc<AssetContext>| async move {
            shopware::sw_config(&ctx).await
        })
        .action("sw:compile", "Generate the Shopware theme cache", |ctx: Arc<AssetContext>| async move {
            shopware::sw_compile(&ctx).await
        })
        .action("sw:cl", "Clear the Shopware cache", |ctx: Arc<AssetContext>| async move {
            shopware::sw_clear_cache(&ctx).await
        });

    graph
        .action("styles:prepare", "Write dev.less and a missing all.less", |ctx: Arc<AssetContext>| async move {
            styles::prepare(&ctx).await
        })
        .action("styles", "Compile the theme LESS", |ctx: Arc<AssetContext>| async move {
            styles::styles(&ctx).await
        })
        .action("scripts", "Bundle the theme scripts with webpack", |ctx: Arc<AssetContext>| async move {
            scripts::scripts(&ctx).await
        });

    graph
        .action("svgstore", "Build the icon sprite", |ctx: Arc<AssetContext>| async move {
            images::svgstore(&ctx).await
        })
        .action("imagemin", "Collect the images of the theme chain", |ctx: Arc<AssetContext>| async move {
            images::imagemin(&ctx).await
        })
        .parallel("images", "svgstore and imagemin", &["svgstore", "imagemin"]);

    graph
        .action("rev:files", "Content hash the images", |ctx: Arc<AssetContext>| async move {
            rev::rev_files_task(&ctx).await
        })
        .action("rev:replace", "Rewrite references to hashed files", |ctx: Arc<AssetContext>| async move {
            rev::rev_replace(&ctx).await
        })
        .series("rev", "rev:files then rev:replace", &["rev:files", "rev:replace"]);

    graph.action(
        "generate-service-worker",
        "Generate the workbox service worker",
        |ctx: Arc<AssetContext>| async move { service_worker::generate_service_worker(&ctx).await },
    );

    for (name, description, command) in [
        ("regression:test", "Run the backstop tests", BackstopCommand::Test),
        ("regression:reference", "Create backstop reference bitmaps", BackstopCommand::Reference),
        ("regression:approve", "Approve the last backstop test run", BackstopCommand::Approve),
    ] {
        graph.action(name, description, move |ctx: Arc<AssetContext>| async move {
            regression::run_backstop(&ctx, command).await
        });
    }

    graph
        .action("clean:dist", "Remove generated files from the theme resources", |ctx: Arc<AssetContext>| async move {
            clean::clean_dist(&ctx).await
        })
        .action("clean:cache", "Remove compiled files and build folders", |ctx: Arc<AssetContext>| async move {
            clean::clean_cache(&ctx).await
        })
        .parallel("clean", "clean:dist and clean:cache", &["clean:dist", "clean:cache"]);

    graph
        .series(
            "assets",
            "Build every asset and regenerate the theme cache",
            &["images", "scripts", "rev", "sw:compile", "generate-service-worker"],
        )
        .series("build", "clean then assets", &["clean", "assets"])
        .parallel("build:compile:parallel", "images and scripts", &["images", "scripts"])
        .series(
            "build:compile:nophp",
            "Build without touching the shop",
            &["clean", "build:compile:parallel", "rev"],
        )
        .series(
            "build:sw:nophp",
            "Generate the service worker without touching the shop",
            &["generate-service-worker"],
        );

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::assets::context::test_support::{context, theme_config, RecordingRunner};
    use crate::application::services::progress::LoggingObserver;
    use tempfile::TempDir;

    #[test]
    fn test_standard_graph_is_complete() {
        let graph = standard_graph();
        graph.validate().unwrap();

        let names: Vec<&str> = graph.list().into_iter().map(|(name, _)| name).collect();
        for task in [
            "sw:host",
            "sw:config",
            "sw:compile",
            "sw:cl",
            "styles:prepare",
            "styles",
            "scripts",
            "svgstore",
            "imagemin",
            "images",
            "rev:files",
            "rev:replace",
            "rev",
            "generate-service-worker",
            "regression:test",
            "regression:reference",
            "regression:approve",
            "clean:dist",
            "clean:cache",
            "clean",
            "assets",
            "build",
            "build:compile:nophp",
            "build:sw:nophp",
        ] {
            assert!(names.contains(&task), "missing task {}", task);
        }
    }

    #[tokio::test]
    async fn test_unknown_task() {
        let temp = TempDir::new().unwrap();
        let ctx = Arc::new(context(
            temp.path(),
            theme_config(&["Custom"]),
            Arc::new(RecordingRunner::default()),
        ));

        let error = standard_graph()
            .run("nope", ctx, &LoggingObserver)
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), r#"Task "nope" is not defined"#);
    }

    #[tokio::test]
    async fn test_clean_runs_both_children() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("web/cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("dev.css"), "").unwrap();

        let ctx = Arc::new(context(
            temp.path(),
            theme_config(&["Custom"]),
            Arc::new(RecordingRunner::default()),
        ));
        standard_graph().run("clean", ctx, &LoggingObserver).await.unwrap();

        assert!(!cache.join("dev.css").exists());
    }
}

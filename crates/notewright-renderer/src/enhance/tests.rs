use std::cell::Cell;

use futures_util::FutureExt;

use super::*;
use crate::loader::{KATEX_JS_URL, LoadFuture, Resource};

struct FailingEngine;

impl ResourceAttacher for FailingEngine {
    fn attach(&self, resource: &Resource) -> LoadFuture {
        let result = if resource.url == KATEX_JS_URL {
            Err(LoadError::new(resource.url.clone(), "blocked"))
        } else {
            Ok(())
        };
        futures_util::future::ready(result).boxed_local()
    }
}

fn placeholders(n: usize) -> String {
    (0..n)
        .map(|i| format!(r#"<div class="custom-video-player" data-video-src="/media/clip{i}.mp4"></div>"#))
        .collect()
}

async fn run_once<A: ResourceAttacher>(
    attacher: A,
    fragment: &mut Fragment,
) -> Result<EnhanceReport, EnhanceError> {
    let loader = LibraryLoader::new(attacher);
    let stack = MathStack::default();
    let config = MathConfig::default();
    let mut readiness = MountReadiness::new();
    let generation = readiness.watch();
    readiness.on_timeout(generation);
    let ticket = PassGuard::new().begin(generation).unwrap();
    EnhancementPass {
        loader: &loader,
        stack: &stack,
        config: &config,
    }
    .run(fragment, ticket, |g| readiness.is_current(g))
    .await
}

#[tokio::test]
async fn every_placeholder_gets_one_player() {
    let mut fragment = Fragment::parse(&format!("<h1>Intro</h1>{}", placeholders(3)));
    let report = run_once(Preloaded, &mut fragment).await.unwrap();
    assert_eq!(report.players_mounted, 3);
    assert_eq!(report.players_failed, 0);
    assert!(fragment.unclaimed_placeholders().is_empty());

    let html = fragment.to_html();
    assert_eq!(html.matches(r#"class="video-container""#).count(), 3);
    for i in 0..3 {
        assert!(html.contains(&format!(r#"<source type="video/mp4" src="/media/clip{i}.mp4">"#)));
    }
    assert_eq!(html.matches(r#"data-initialized="true""#).count(), 3);
}

#[tokio::test]
async fn second_pass_changes_nothing() {
    let mut fragment = Fragment::parse(&format!(
        r#"{}<p>$x^2$</p><img src="/fig.png" alt="figure">"#,
        placeholders(2)
    ));
    let first = run_once(Preloaded, &mut fragment).await.unwrap();
    assert_eq!(first.players_mounted, 2);
    assert_eq!(first.images_wrapped, 1);
    let after_first = fragment.to_html();

    let second = run_once(Preloaded, &mut fragment).await.unwrap();
    assert_eq!(second.players_mounted, 0);
    assert_eq!(second.images_wrapped, 0);
    assert_eq!(second.math, MathOutcome::Rendered(MathStats::default()));
    assert_eq!(fragment.to_html(), after_first);
}

#[tokio::test]
async fn placeholder_without_source_is_left_alone() {
    let mut fragment = Fragment::parse(
        r#"<div class="custom-video-player" data-video-src=""></div><div class="custom-video-player"></div>"#,
    );
    let report = run_once(Preloaded, &mut fragment).await.unwrap();
    assert_eq!(report.players_mounted, 0);
    assert!(!fragment.to_html().contains("video-container"));
}

#[tokio::test]
async fn source_entities_survive_mounting() {
    let mut fragment = Fragment::parse(
        r#"<div class="custom-video-player" data-video-src="/v.mp4?a=1&amp;b=2"></div>"#,
    );
    run_once(Preloaded, &mut fragment).await.unwrap();
    assert!(fragment.to_html().contains(r#"src="/v.mp4?a=1&amp;b=2""#));
}

#[tokio::test]
async fn image_gets_wrapper_and_button() {
    let mut fragment = Fragment::parse(r#"<p><img src="/a.png"></p>"#);
    let report = run_once(Preloaded, &mut fragment).await.unwrap();
    assert_eq!(report.images_wrapped, 1);

    let img = fragment.elements_named(fragment.root(), "img")[0];
    let wrapper = fragment.parent(img).unwrap();
    assert!(fragment.has_class(wrapper, IMAGE_WRAPPER_CLASS));
    assert_eq!(fragment.elements_with_class(wrapper, IMAGE_BUTTON_CLASS).len(), 1);
    assert_eq!(fragment.tag_name(fragment.parent(wrapper).unwrap()), Some("p"));
}

#[tokio::test]
async fn player_markup_images_are_not_wrapped() {
    // the poster-less player template has no images of its own
    let mut fragment = Fragment::parse(&placeholders(1));
    let report = run_once(Preloaded, &mut fragment).await.unwrap();
    assert_eq!(report.images_wrapped, 0);
}

#[tokio::test]
async fn math_failure_does_not_stop_the_pass() {
    let mut fragment = Fragment::parse(&format!(
        r#"{}<p>$E = mc^2$</p><img src="/b.png">"#,
        placeholders(1)
    ));
    let report = run_once(FailingEngine, &mut fragment).await.unwrap();
    assert!(matches!(report.math, MathOutcome::Unavailable(ref err) if err.url == KATEX_JS_URL));
    assert_eq!(report.players_mounted, 1);
    assert_eq!(report.images_wrapped, 1);
    assert!(fragment.to_html().contains("$E = mc^2$"));
}

#[tokio::test]
async fn stale_pass_leaves_the_host_untouched() {
    let mut fragment = Fragment::parse(&placeholders(2));
    let before = fragment.to_html();
    let loader = LibraryLoader::new(Preloaded);
    let stack = MathStack::default();
    let config = MathConfig::default();
    let mut readiness = MountReadiness::new();
    let generation = readiness.watch();
    let ticket = PassGuard::new().begin(generation).unwrap();

    // current when the pass starts, replaced by the time loading resolves
    let checks = Cell::new(0);
    let err = EnhancementPass {
        loader: &loader,
        stack: &stack,
        config: &config,
    }
    .run(&mut fragment, ticket, |_| {
        checks.set(checks.get() + 1);
        checks.get() == 1
    })
    .await
    .unwrap_err();

    assert_eq!(
        err,
        EnhanceError::Stale {
            generation: generation.get()
        }
    );
    assert_eq!(fragment.to_html(), before);
    readiness.reset();
}

#[test]
fn guard_admits_each_generation_once() {
    let mut readiness = MountReadiness::new();
    let mut guard = PassGuard::new();
    let first = readiness.watch();
    let second = readiness.watch();

    assert!(guard.begin(second).is_some());
    assert!(guard.begin(second).is_none());
    // an older generation arriving late is refused too
    assert!(guard.begin(first).is_none());
    let third = readiness.watch();
    assert_eq!(guard.begin(third).map(|t| t.generation()), Some(third));
}

#[tokio::test]
async fn rapid_reassignment_runs_only_the_last_content() {
    let mut readiness = MountReadiness::new();
    let mut guard = PassGuard::new();
    let generations: Vec<_> = (0..4).map(|_| readiness.watch()).collect();

    let tickets: Vec<_> = generations
        .iter()
        .filter_map(|g| readiness.on_timeout(*g))
        .filter_map(|event| guard.begin(event.generation))
        .collect();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].generation(), generations[3]);
}

#[tokio::test]
async fn enhance_html_runs_everything() {
    let (fragment, report) = enhance_html(&format!(
        r#"<h2>Waves</h2>{}<p>Display: $$\frac{{1}}{{2}}$$</p><img src="/w.png">"#,
        placeholders(2)
    ))
    .await
    .unwrap();
    assert_eq!(report.players_mounted, 2);
    assert_eq!(report.images_wrapped, 1);
    assert_eq!(report.math, MathOutcome::Rendered(MathStats { rendered: 1, failed: 0 }));
    assert!(fragment.to_html().contains("math-display"));
}

#[tokio::test]
async fn enhanced_markup_matches_snapshot() {
    let (fragment, report) = enhance_html(
        r#"<section><h2>Springs</h2><div class="custom-video-player" data-video-src="/media/spring.mp4"></div><p>Energy: $E = mc^2$</p><img src="/media/diagram.png" alt="diagram"></section>"#,
    )
    .await
    .unwrap();
    assert_eq!(report.players_mounted, 1);
    assert_eq!(report.images_wrapped, 1);
    insta::assert_snapshot!("enhanced_section", fragment.to_html());
}

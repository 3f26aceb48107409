//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the scanned manifest and writes the
//! final static site, once per locale.
//!
//! ## Generated Pages
//!
//! - **Home** (`/index.html`): hero, capabilities, featured products, quality
//!   and the `#contact` section with the contact form
//! - **Products** (`/products/index.html`): fresh and processed listings
//! - **Product detail** (`/products/{slug}/index.html`)
//! - **Certifications** (`/certifications/index.html`)
//!
//! The default locale lives at the site root, every other locale under
//! `/{code}/` with the same layout. The header's language switch links to the
//! equivalent page in the other locale.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── products/
//! │   ├── index.html
//! │   └── avocados-hass/index.html
//! ├── certifications/index.html
//! ├── es/…                        # same tree, Spanish
//! ├── style-3f2a9c01d4.css        # colors + static/style.css, fingerprinted
//! ├── reveal-81b07e55aa.js        # omitted when prerendering revealed
//! └── favicon.svg                 # copied from content/assets/
//! ```
//!
//! ## Scroll Reveal
//!
//! Every revealable element is registered with a [`RevealScope`], which runs
//! the real reveal schedulers against a markup host and turns their effects
//! into attributes. Each rendered page also yields a [`RevealPlan`] that the
//! `timeline` command replays in a simulated viewport.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::config::{self, Prerender, SiteConfig, SiteSection};
use crate::i18n::{Locale, Translator};
use crate::markup::{RevealAttrs, RevealPlan, RevealScope, reveal_div, reveal_link};
use crate::reveal::{GroupOptions, RevealOptions, Variant};
use crate::scan::Manifest;
use crate::types::{AccentColor, Product};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Asset copy failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No product with slug '{0}'")]
    UnknownProduct(String),
    #[error("Unknown page '{0}' (expected home, products, product:<slug> or certifications)")]
    UnknownPage(String),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/reveal.js");

/// Shown to visitors without JavaScript, so reveal never hides content.
const NOSCRIPT_CSS: &str = ".reveal { opacity: 1; transform: none; }";

// ============================================================================
// Routes
// ============================================================================

/// A page of the site, independent of locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Products,
    Product(String),
    Certifications,
}

impl Route {
    /// Path below the locale root, with trailing slash.
    fn segments(&self) -> String {
        match self {
            Route::Home => String::new(),
            Route::Products => "products/".to_string(),
            Route::Product(slug) => format!("products/{slug}/"),
            Route::Certifications => "certifications/".to_string(),
        }
    }

    /// Absolute URL path of this page in `locale`.
    pub fn href(&self, locale: Locale, site: &SiteSection) -> String {
        format!(
            "{}{}/{}",
            site.base_path.trim_end_matches('/'),
            locale.url_prefix(site.default_locale),
            self.segments()
        )
    }

    /// File to write, relative to the output directory.
    pub fn output_path(&self, locale: Locale, default: Locale) -> PathBuf {
        let mut path = PathBuf::new();
        if locale != default {
            path.push(locale.code());
        }
        path.push(self.segments());
        path.push("index.html");
        path
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("home"),
            Route::Products => f.write_str("products"),
            Route::Product(slug) => write!(f, "product:{slug}"),
            Route::Certifications => f.write_str("certifications"),
        }
    }
}

impl FromStr for Route {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Route::Home),
            "products" => Ok(Route::Products),
            "certifications" => Ok(Route::Certifications),
            _ => match s.strip_prefix("product:") {
                Some(slug) if !slug.is_empty() => Ok(Route::Product(slug.to_string())),
                _ => Err(GenerateError::UnknownPage(s.to_string())),
            },
        }
    }
}

/// Every page of the site, in write order.
pub fn routes(manifest: &Manifest) -> Vec<Route> {
    let mut routes = vec![Route::Home, Route::Products];
    routes.extend(manifest.products.iter().map(|p| Route::Product(p.slug.clone())));
    routes.push(Route::Certifications);
    routes
}

// ============================================================================
// Assets
// ============================================================================

/// Stylesheet and script with their fingerprinted file names.
#[derive(Debug, Clone)]
pub struct SiteAssets {
    pub css: String,
    pub css_file: String,
    /// `None` when pages are prerendered revealed.
    pub js_file: Option<String>,
}

impl SiteAssets {
    pub fn new(config: &SiteConfig) -> Self {
        let css = format!("{}\n\n{}", config::generate_color_css(&config.colors), CSS_STATIC);
        let css_file = format!("style-{}.css", fingerprint(css.as_bytes()));
        let js_file = (config.reveal.prerender == Prerender::Animated)
            .then(|| format!("reveal-{}.js", fingerprint(JS.as_bytes())));
        Self {
            css,
            css_file,
            js_file,
        }
    }
}

/// First 10 hex digits of the SHA-256 of `bytes`.
pub fn fingerprint(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .take(5)
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Copy `src` into `dst` recursively. Returns the number of files copied; a
/// missing `src` copies nothing.
fn copy_assets(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    if !src.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let dest = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// Entry points
// ============================================================================

/// One written page.
#[derive(Debug, Clone)]
pub struct GeneratedPage {
    pub route: Route,
    /// Relative to the output directory.
    pub path: PathBuf,
    pub locale: Locale,
    pub reveal_elements: usize,
}

#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub pages: Vec<GeneratedPage>,
    pub stylesheet: String,
    pub script: Option<String>,
    pub assets_copied: usize,
}

/// A page rendered in memory.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub plan: RevealPlan,
}

/// Generate the site from a `manifest.json` written by the scan stage.
pub fn generate(manifest_path: &Path, output_dir: &Path) -> Result<GenerateReport, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;
    generate_site(&manifest, output_dir)
}

pub fn generate_site(manifest: &Manifest, output_dir: &Path) -> Result<GenerateReport, GenerateError> {
    let assets = SiteAssets::new(&manifest.config);
    let default = manifest.config.site.default_locale;

    fs::create_dir_all(output_dir)?;
    fs::write(output_dir.join(&assets.css_file), &assets.css)?;
    if let Some(js_file) = &assets.js_file {
        fs::write(output_dir.join(js_file), JS)?;
    }
    let assets_copied = copy_assets(&manifest.source.join("assets"), output_dir)?;

    let mut pages = Vec::new();
    for locale in Locale::ALL {
        for route in routes(manifest) {
            let rendered = render_with_assets(manifest, &route, locale, &assets)?;
            let rel = route.output_path(locale, default);
            let dest = output_dir.join(&rel);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, rendered.html)?;
            let reveal_elements = rendered.plan.element_count();
            debug!(page = %rel.display(), reveal_elements, "page written");
            pages.push(GeneratedPage {
                route,
                path: rel,
                locale,
                reveal_elements,
            });
        }
    }

    Ok(GenerateReport {
        pages,
        stylesheet: assets.css_file,
        script: assets.js_file,
        assets_copied,
    })
}

/// Render one page in memory.
pub fn render_page(
    manifest: &Manifest,
    route: &Route,
    locale: Locale,
) -> Result<RenderedPage, GenerateError> {
    let assets = SiteAssets::new(&manifest.config);
    render_with_assets(manifest, route, locale, &assets)
}

fn render_with_assets(
    manifest: &Manifest,
    route: &Route,
    locale: Locale,
    assets: &SiteAssets,
) -> Result<RenderedPage, GenerateError> {
    let page = Page {
        manifest,
        route,
        locale,
        tr: manifest.catalog.translator(locale),
        assets,
    };
    let mut scope = RevealScope::new(manifest.config.reveal.prerender, manifest.config.reveal.presets());

    let (title, content) = match route {
        Route::Home => (page.site().title.clone(), render_home(&page, &mut scope)),
        Route::Products => (page.t("productsPage.title"), render_products(&page, &mut scope)),
        Route::Product(slug) => {
            let product = manifest
                .products
                .iter()
                .find(|p| &p.slug == slug)
                .ok_or_else(|| GenerateError::UnknownProduct(slug.clone()))?;
            (
                product.name.get(locale).to_string(),
                render_product(&page, product, &mut scope),
            )
        }
        Route::Certifications => (
            page.t("certifications.title"),
            render_certifications(&page, &mut scope),
        ),
    };

    let html = base_document(&page, &title, content).into_string();
    Ok(RenderedPage {
        html,
        plan: scope.into_plan(),
    })
}

// ============================================================================
// Page context
// ============================================================================

struct Page<'a> {
    manifest: &'a Manifest,
    route: &'a Route,
    locale: Locale,
    tr: Translator<'a>,
    assets: &'a SiteAssets,
}

impl Page<'_> {
    fn site(&self) -> &SiteSection {
        &self.manifest.config.site
    }

    fn t(&self, key: &str) -> String {
        self.tr.t(key)
    }

    fn href(&self, route: &Route) -> String {
        route.href(self.locale, self.site())
    }

    /// Link to a section of the home page.
    fn anchor(&self, id: &str) -> String {
        format!("{}#{id}", self.href(&Route::Home))
    }

    /// URL of a file at the output root.
    fn asset(&self, path: &str) -> String {
        format!("{}/{}", self.site().base_path.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(page: &Page, title: &str, content: Markup) -> Markup {
    let site = page.site();
    let full_title = if title == site.title {
        title.to_string()
    } else {
        format!("{title} | {}", site.title)
    };
    let other = page.locale.toggled();
    html! {
        (DOCTYPE)
        html lang=(page.locale.code()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
                link rel="stylesheet" href=(page.asset(&page.assets.css_file));
                link rel="icon" href=(page.asset("favicon.svg"));
                link rel="alternate" hreflang=(other.code()) href=(page.route.href(other, site));
                @if let Some(js_file) = &page.assets.js_file {
                    noscript { style { (NOSCRIPT_CSS) } }
                    script src=(page.asset(js_file)) defer {}
                }
            }
            body {
                (site_header(page))
                main { (content) }
                (site_footer(page))
            }
        }
    }
}

/// Renders the site header with navigation and the language switch
fn site_header(page: &Page) -> Markup {
    let other = page.locale.toggled();
    let on = |route: &Route| page.route == route;
    html! {
        header.site-header {
            a.brand href=(page.href(&Route::Home)) { (page.site().title) }
            nav.site-nav {
                input.nav-toggle type="checkbox" id="nav-toggle";
                label.nav-hamburger for="nav-toggle" {
                    span.hamburger-line {}
                    span.hamburger-line {}
                    span.hamburger-line {}
                }
                div.nav-panel {
                    ul {
                        li.current[on(&Route::Products) || matches!(page.route, Route::Product(_))] {
                            a href=(page.href(&Route::Products)) { (page.t("nav.products")) }
                        }
                        li { a href=(page.anchor("about")) { (page.t("nav.about")) } }
                        li { a href=(page.anchor("quality")) { (page.t("nav.quality")) } }
                        li.current[on(&Route::Certifications)] {
                            a href=(page.href(&Route::Certifications)) { (page.t("nav.certifications")) }
                        }
                        li { a href=(page.anchor("contact")) { (page.t("nav.contact")) } }
                        li.lang-switch {
                            a href=(page.route.href(other, page.site())) hreflang=(other.code()) lang=(other.code()) {
                                (other.switch_label())
                            }
                        }
                        li { a.cta href=(page.anchor("contact")) { (page.t("nav.getPricing")) } }
                    }
                }
            }
        }
    }
}

fn site_footer(page: &Page) -> Markup {
    let home = &page.manifest.home;
    let year = page.site().copyright_year.to_string();
    html! {
        footer.site-footer {
            div.container {
                div.footer-about {
                    p.brand { (page.site().title) }
                    p { (page.t("footer.description")) }
                    p.tagline {
                        (page.t("footer.tagline"))
                        span.tagline-accent { (page.t("footer.taglineAccent")) }
                    }
                }
                div.footer-links {
                    h3 { (page.t("footer.quickLinks")) }
                    ul {
                        li { a href=(page.href(&Route::Products)) { (page.t("nav.products")) } }
                        li { a href=(page.href(&Route::Certifications)) { (page.t("nav.certifications")) } }
                        li { a href=(page.anchor("contact")) { (page.t("nav.contact")) } }
                    }
                }
                div.footer-contact {
                    h3 { (page.t("footer.contactUs")) }
                    ul {
                        @for contact in &home.contacts {
                            li { a href={ "mailto:" (contact.email) } { (contact.email) } }
                        }
                    }
                    p { (home.location.get(page.locale)) }
                }
                p.copyright { (page.tr.t_with("footer.copyright", &[("year", year.as_str())])) }
            }
        }
    }
}

/// Image, or a labelled placeholder while photography is pending.
fn figure(page: &Page, src: Option<&str>, alt: &str, placeholder: &str) -> Markup {
    html! {
        @if let Some(src) = src {
            img src=(page.asset(src)) alt=(alt) loading="lazy";
        } @else {
            div.image-placeholder role="img" aria-label=(alt) {
                span { (placeholder) }
            }
        }
    }
}

/// Label, title and description of a page section, from `{prefix}.*`.
fn section_header(page: &Page, scope: &mut RevealScope, prefix: &str) -> Markup {
    let attrs = scope.single(&format!("{prefix} header"), RevealOptions::default(), 180.0);
    reveal_div(&attrs, "section-header", html! {
        p.section-label { (page.t(&format!("{prefix}.label"))) }
        h2 { (page.t(&format!("{prefix}.title"))) }
        p { (page.t(&format!("{prefix}.description"))) }
    })
}

fn product_card(page: &Page, product: &Product, index: usize, attrs: &RevealAttrs) -> Markup {
    let name = product.name.get(page.locale);
    let href = page.href(&Route::Product(product.slug.clone()));
    reveal_link(attrs, "card product-card", &href, html! {
        span.card-accent style={ "background: " (AccentColor::cycle(index).css_var()) } {}
        (figure(page, product.listing_image(), name, name))
        h3 { (name) }
        p { (product.summary.get(page.locale)) }
        p.origin { (product.origin_label()) }
        span.more { (page.t("products.learnMore")) " →" }
    })
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_home(page: &Page, scope: &mut RevealScope) -> Markup {
    html! {
        (render_hero(page, scope))
        (render_capabilities(page, scope))
        (render_product_focus(page, scope))
        (render_quality(page, scope))
        (render_contact(page, scope))
    }
}

fn render_hero(page: &Page, scope: &mut RevealScope) -> Markup {
    let text = scope.single("hero text", RevealOptions::default(), 420.0);
    let image = scope.beside("hero image", RevealOptions::image().with_delay(ms(100)), 420.0);
    let headline = page.t("hero.headline");
    html! {
        section.hero #top {
            div.container {
                (reveal_div(&text, "hero-text", html! {
                    p.section-label { (page.t("hero.tagline")) }
                    h1 {
                        (headline)
                        span.accent { (page.t("hero.headlineAccent")) }
                    }
                    p { (page.t("hero.description")) }
                    p.actions {
                        a.button href=(page.anchor("contact")) { (page.t("hero.cta")) }
                        " "
                        a class="button button--ghost" href=(page.href(&Route::Products)) { (page.t("hero.ctaSecondary")) }
                    }
                    p.credibility { (page.t("hero.credibility")) }
                }))
                (reveal_div(&image, "hero-image", figure(
                    page,
                    page.manifest.home.hero_image.as_deref(),
                    &headline,
                    &page.site().brand,
                )))
            }
        }
    }
}

fn render_capabilities(page: &Page, scope: &mut RevealScope) -> Markup {
    let capabilities = &page.manifest.home.capabilities;
    let header = section_header(page, scope, "capabilities");
    let cards = scope.group(
        "capability cards",
        GroupOptions::staggered(Variant::Image, 120),
        capabilities.len(),
        3,
        380.0,
    );
    html! {
        section.capabilities #about {
            div.container {
                (header)
                div.grid {
                    @for (capability, attrs) in capabilities.iter().zip(&cards) {
                        @let title = page.t(&format!("capabilities.{}.title", capability.id));
                        @let alt = capability.image_alt.as_ref().map(|a| a.get(page.locale)).unwrap_or(&title);
                        (reveal_div(attrs, "card", html! {
                            span.card-accent style={ "background: " (capability.accent.css_var()) } {}
                            (figure(page, capability.image.as_deref(), alt, &title))
                            h3 { (title) }
                            p { (page.t(&format!("capabilities.{}.description", capability.id))) }
                        }))
                    }
                }
            }
        }
    }
}

fn render_product_focus(page: &Page, scope: &mut RevealScope) -> Markup {
    let featured: Vec<&Product> = page.manifest.featured_products().collect();
    let header = section_header(page, scope, "products");
    let cards = scope.group(
        "featured products",
        GroupOptions::staggered(Variant::Image, 120),
        featured.len(),
        3,
        400.0,
    );
    let more = scope.single("more products", RevealOptions::default(), 140.0);
    html! {
        section.product-focus #products {
            div.container {
                (header)
                div.grid {
                    @for (index, (product, attrs)) in featured.iter().zip(&cards).enumerate() {
                        (product_card(page, product, index, attrs))
                    }
                }
                (reveal_div(&more, "more-products", html! {
                    h3 { (page.t("products.alsoAvailable")) }
                    ul {
                        @for item in &page.manifest.home.more_products {
                            li { (item.get(page.locale)) }
                        }
                    }
                    a.button href=(page.href(&Route::Products)) { (page.t("products.viewAll")) }
                }))
            }
        }
    }
}

fn render_quality(page: &Page, scope: &mut RevealScope) -> Markup {
    let home = &page.manifest.home;
    let header = section_header(page, scope, "quality");
    let pillars = scope.group(
        "quality pillars",
        GroupOptions::staggered(Variant::Default, 80),
        home.pillars.len(),
        3,
        220.0,
    );
    let certs = scope.single("quality certifications", RevealOptions::default(), 140.0);
    html! {
        section.quality #quality {
            div.container {
                (header)
                div.grid {
                    @for (pillar, attrs) in home.pillars.iter().zip(&pillars) {
                        (reveal_div(attrs, "card pillar", html! {
                            h3 { (page.t(&format!("quality.{pillar}.title"))) }
                            p { (page.t(&format!("quality.{pillar}.description"))) }
                        }))
                    }
                }
                (reveal_div(&certs, "quality-certifications", html! {
                    ul.cert-list {
                        @for id in &home.quality_certifications {
                            @if let Some(cert) = page.manifest.certification(id) {
                                li { (cert.label) }
                            }
                        }
                    }
                    a href=(page.href(&Route::Certifications)) { (page.t("nav.certifications")) " →" }
                }))
            }
        }
    }
}

fn render_contact(page: &Page, scope: &mut RevealScope) -> Markup {
    let home = &page.manifest.home;
    let text = scope.single("contact text", RevealOptions::image(), 420.0);
    let form = scope.beside("contact form", RevealOptions::default().with_delay(ms(100)), 520.0);
    html! {
        section.contact #contact {
            div.container {
                (reveal_div(&text, "contact-text", html! {
                    p.section-label { (page.t("contact.label")) }
                    h2 { (page.t("contact.title")) }
                    p { (page.t("contact.description")) }
                    ul.contacts {
                        @for contact in &home.contacts {
                            li.contact-person {
                                @if let Some(name) = &contact.name {
                                    strong { (name) }
                                    br;
                                }
                                span.role { (page.t(&contact.role)) }
                                br;
                                a href={ "mailto:" (contact.email) } { (contact.email) }
                                @if let (Some(phone), Some(tel)) = (&contact.phone, contact.phone_href()) {
                                    br;
                                    a href=(tel) { (phone) }
                                }
                            }
                        }
                    }
                    p.location {
                        strong { (page.t("contact.location")) }
                        br;
                        (home.location.get(page.locale))
                    }
                }))
                (reveal_div(&form, "contact-form", html! {
                    form action=(page.site().form_action) method="post" {
                        label {
                            (page.t("contact.form.name"))
                            input type="text" name="name" required placeholder=(page.t("contact.form.namePlaceholder"));
                        }
                        label {
                            (page.t("contact.form.email"))
                            input type="email" name="email" required placeholder=(page.t("contact.form.emailPlaceholder"));
                        }
                        label {
                            (page.t("contact.form.company"))
                            input type="text" name="company" placeholder=(page.t("contact.form.companyPlaceholder"));
                        }
                        label {
                            (page.t("contact.form.message"))
                            textarea name="message" rows="5" required placeholder=(page.t("contact.form.messagePlaceholder")) {}
                        }
                        button.button type="submit" { (page.t("contact.form.submit")) }
                    }
                    @if let Some(first) = home.contacts.first() {
                        p.email-direct {
                            (page.t("contact.form.emailDirect")) " "
                            a href={ "mailto:" (first.email) } { (first.email) }
                        }
                    }
                }))
            }
        }
    }
}

fn render_products(page: &Page, scope: &mut RevealScope) -> Markup {
    let (fresh, processed): (Vec<&Product>, Vec<&Product>) = page
        .manifest
        .listed_products()
        .partition(|p| !p.category.is_processed());
    let header = section_header(page, scope, "productsPage");
    // One group for both sections so the stagger continues across them.
    let cards = scope.group(
        "product cards",
        GroupOptions::staggered(Variant::Image, 80),
        fresh.len() + processed.len(),
        3,
        400.0,
    );
    let (fresh_cards, processed_cards) = cards.split_at(fresh.len());
    html! {
        section.products-page {
            div.container {
                (header)
                @if !fresh.is_empty() {
                    h2 { (page.t("productsPage.fresh")) }
                    div.grid {
                        @for (index, (product, attrs)) in fresh.iter().zip(fresh_cards).enumerate() {
                            (product_card(page, product, index, attrs))
                        }
                    }
                }
                @if !processed.is_empty() {
                    h2 { (page.t("productsPage.processed")) }
                    div.grid {
                        @for (index, (product, attrs)) in processed.iter().zip(processed_cards).enumerate() {
                            (product_card(page, product, fresh.len() + index, attrs))
                        }
                    }
                }
            }
        }
    }
}

fn render_product(page: &Page, product: &Product, scope: &mut RevealScope) -> Markup {
    let locale = page.locale;
    let name = product.name.get(locale);
    let header = scope.single("product header", RevealOptions::default(), 180.0);
    let content = scope.single("product details", RevealOptions::default().with_delay(ms(100)), 900.0);
    let placeholder = format!("{} · {}", page.t("productDetail.productImage"), page.t("productDetail.individualSku"));
    html! {
        section.product-detail {
            div.container {
                a.back href=(page.href(&Route::Products)) { (page.t("productDetail.backToProducts")) }
                (reveal_div(&header, "section-header", html! {
                    p.section-label { (page.site().brand) }
                    h1 { (name) }
                    p { (product.summary.get(locale)) }
                }))
                (reveal_div(&content, "product-content", html! {
                    (figure(page, product.image.as_deref(), name, &placeholder))
                    div.description {
                        (PreEscaped(markdown_to_html(product.description.get(locale))))
                    }
                    dl.facts {
                        dt { (page.t("productDetail.seasonality")) }
                        dd { (product.seasonality.get(locale)) }
                        dt { (page.t("productDetail.origin")) }
                        dd { (product.origin_label()) }
                        @if !product.certifications.is_empty() {
                            dt { (page.t("productDetail.certifications")) }
                            dd { (product.certifications.join(", ")) }
                        }
                    }
                    @if !product.packaging.is_empty() {
                        h3 { (page.t("productDetail.packagingOptions")) }
                        ul.packaging {
                            @for option in &product.packaging {
                                li { (option.get(locale)) }
                            }
                        }
                    }
                    @if let Some(assortment) = &product.assortment {
                        div.assortment {
                            h3 { (assortment.title.get(locale)) }
                            @if let Some(note) = &assortment.note {
                                p { (note.get(locale)) }
                            }
                            div.grid {
                                @for item in &assortment.items {
                                    @let item_name = item.name.get(locale);
                                    div.assortment-item {
                                        (figure(page, item.image.as_deref(), item_name, &page.t("productDetail.assortmentView")))
                                        p { (item_name) }
                                    }
                                }
                            }
                        }
                    }
                    div.boxes-pallets {
                        h3 { (page.t("productDetail.boxesPalletsTitle")) }
                        p { (page.t("productDetail.boxesPalletsDescription")) }
                    }
                    a.button href=(page.anchor("contact")) { (page.t("productDetail.contactForPricing")) }
                }))
            }
        }
    }
}

fn render_certifications(page: &Page, scope: &mut RevealScope) -> Markup {
    let certifications = &page.manifest.certifications;
    let header = scope.single("certifications header", RevealOptions::default(), 180.0);
    let intro = scope.single("certifications intro", RevealOptions::default().with_delay(ms(100)), 260.0);
    let badges = scope.group(
        "certification badges",
        GroupOptions::staggered(Variant::Default, 50),
        certifications.len(),
        5,
        200.0,
    );
    html! {
        section.certifications-page {
            div.container {
                (reveal_div(&header, "section-header", html! {
                    p.section-label { (page.t("certifications.label")) }
                    h1 { (page.t("certifications.title")) }
                }))
                (reveal_div(&intro, "certifications-intro", html! {
                    h2 { (page.t("certifications.introTitle")) }
                    p { (page.t("certifications.intro")) }
                    p.note { (page.t("certifications.partnerNote")) }
                }))
                h2 { (page.t("certifications.badgeGridTitle")) }
                div class="grid grid--badges" {
                    @for (cert, attrs) in certifications.iter().zip(&badges) {
                        @let class = if cert.placeholder { "badge badge--placeholder" } else { "badge" };
                        (reveal_div(attrs, class, html! {
                            span.badge-mark { (cert.badge()) }
                            h3 { (cert.label) }
                            p { (cert.description.get(page.locale)) }
                        }))
                    }
                }
                p.request-note { (page.t("certifications.requestNote")) }
                a.button href=(page.anchor("contact")) { (page.t("certifications.contactCta")) }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn render(manifest: &Manifest, route: Route, locale: Locale) -> String {
        render_page(manifest, &route, locale).unwrap().html
    }

    // =========================================================================
    // Routes
    // =========================================================================

    #[test]
    fn route_hrefs_per_locale() {
        let site = SiteSection::default();
        assert_eq!(Route::Home.href(Locale::En, &site), "/");
        assert_eq!(Route::Home.href(Locale::Es, &site), "/es/");
        assert_eq!(
            Route::Product("lemons".into()).href(Locale::Es, &site),
            "/es/products/lemons/"
        );
    }

    #[test]
    fn route_hrefs_respect_base_path() {
        let site = SiteSection {
            base_path: "/ggp/".to_string(),
            ..SiteSection::default()
        };
        assert_eq!(Route::Products.href(Locale::En, &site), "/ggp/products/");
        assert_eq!(Route::Certifications.href(Locale::Es, &site), "/ggp/es/certifications/");
    }

    #[test]
    fn spanish_default_moves_english_under_prefix() {
        let site = SiteSection {
            default_locale: Locale::Es,
            ..SiteSection::default()
        };
        assert_eq!(Route::Home.href(Locale::Es, &site), "/");
        assert_eq!(Route::Home.href(Locale::En, &site), "/en/");
        assert_eq!(
            Route::Products.output_path(Locale::En, Locale::Es),
            PathBuf::from("en/products/index.html")
        );
    }

    #[test]
    fn route_output_paths() {
        assert_eq!(Route::Home.output_path(Locale::En, Locale::En), PathBuf::from("index.html"));
        assert_eq!(
            Route::Product("pulp".into()).output_path(Locale::Es, Locale::En),
            PathBuf::from("es/products/pulp/index.html")
        );
    }

    #[test]
    fn route_parses_from_cli_names() {
        assert_eq!("home".parse::<Route>().unwrap(), Route::Home);
        assert_eq!(
            "product:avocados-hass".parse::<Route>().unwrap(),
            Route::Product("avocados-hass".into())
        );
        assert!("product:".parse::<Route>().is_err());
        assert!("about".parse::<Route>().is_err());
        assert_eq!(Route::Product("pulp".into()).to_string(), "product:pulp");
    }

    // =========================================================================
    // Assets
    // =========================================================================

    #[test]
    fn fingerprint_is_stable_hex() {
        let a = fingerprint(b"body {}");
        assert_eq!(a.len(), 10);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, fingerprint(b"body {}"));
        assert_ne!(a, fingerprint(b"body { }"));
    }

    #[test]
    fn stylesheet_name_follows_colors() {
        let mut config = SiteConfig::default();
        let before = SiteAssets::new(&config);
        config.colors.primary = "#000000".to_string();
        let after = SiteAssets::new(&config);
        assert_ne!(before.css_file, after.css_file);
        assert!(after.css.contains("--color-primary: #000000"));
    }

    #[test]
    fn no_script_when_prerendered() {
        let mut config = SiteConfig::default();
        assert!(SiteAssets::new(&config).js_file.is_some());
        config.reveal.prerender = Prerender::Revealed;
        assert!(SiteAssets::new(&config).js_file.is_none());
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn home_page_document_shape() {
        let (_tmp, manifest) = scanned_content();
        let html = render(&manifest, Route::Home, Locale::En);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(html.contains("Avocados, Dragon Fruit &amp; Tropicals"));
        assert!(html.contains(r#"id="contact""#));
        assert!(html.contains("<script src=\"/reveal-"));
        assert!(html.contains("<noscript>"));
    }

    #[test]
    fn spanish_page_uses_spanish_copy_and_links_back() {
        let (_tmp, manifest) = scanned_content();
        let html = render(&manifest, Route::Products, Locale::Es);
        assert!(html.contains(r#"<html lang="es">"#));
        assert!(html.contains("Productos"));
        let switch = tag_containing(&html, r#"hreflang="en" lang="en""#);
        assert!(switch.contains(r#"href="/products/""#), "switch: {switch}");
    }

    #[test]
    fn english_switch_points_at_spanish_equivalent() {
        let (_tmp, manifest) = scanned_content();
        let html = render(&manifest, Route::Product("lemons".into()), Locale::En);
        let switch = tag_containing(&html, r#"hreflang="es" lang="es""#);
        assert!(switch.contains(r#"href="/es/products/lemons/""#), "switch: {switch}");
    }

    #[test]
    fn capability_cards_are_staggered() {
        let (_tmp, manifest) = scanned_content();
        let html = render(&manifest, Route::Home, Locale::En);
        assert!(html.contains("--reveal-delay: 120ms"));
        assert!(html.contains("--reveal-delay: 240ms"));
        assert!(html.contains(r#"class="reveal reveal--image card""#));
    }

    #[test]
    fn hero_image_waits_100ms() {
        let (_tmp, manifest) = scanned_content();
        let html = render(&manifest, Route::Home, Locale::En);
        let tag = tag_containing(&html, "hero-image");
        assert!(tag.contains("reveal--image"));
        assert!(tag.contains("--reveal-delay: 100ms"));
        assert!(tag.contains(r#"data-reveal-margin="0px 0px -25% 0px""#));
    }

    #[test]
    fn product_stagger_continues_into_processed_section() {
        let (_tmp, manifest) = scanned_content();
        let listed = manifest.listed_products().count();
        let html = render(&manifest, Route::Products, Locale::En);
        let last = format!("--reveal-delay: {}ms", (listed - 1) * 80);
        assert!(html.contains(&last), "missing {last}");
        assert_eq!(count(&html, "product-card"), listed);
    }

    #[test]
    fn animated_pages_start_hidden() {
        let (_tmp, manifest) = scanned_content();
        let rendered = render_page(&manifest, &Route::Certifications, Locale::En).unwrap();
        assert!(!rendered.html.contains("data-revealed"));
        assert_eq!(
            count(&rendered.html, "data-reveal-threshold"),
            rendered.plan.element_count()
        );
    }

    #[test]
    fn prerendered_pages_ship_revealed() {
        let (_tmp, mut manifest) = scanned_content();
        manifest.config.reveal.prerender = Prerender::Revealed;
        let rendered = render_page(&manifest, &Route::Home, Locale::En).unwrap();
        let html = &rendered.html;
        assert_eq!(count(html, r#"data-revealed="true""#), rendered.plan.element_count());
        assert!(!html.contains("<script"));
        assert!(!html.contains("--reveal-delay"));
    }

    #[test]
    fn product_description_renders_markdown() {
        let (_tmp, manifest) = scanned_content();
        let html = render(&manifest, Route::Product("avocados-hass".into()), Locale::En);
        assert!(html.contains("<strong>year-round</strong>"));
        assert!(html.contains("Zavaya Hass Avocados | Global Gate Produce"));
    }

    #[test]
    fn assortment_renders_items() {
        let (_tmp, manifest) = scanned_content();
        let html = render(&manifest, Route::Product("frozen".into()), Locale::Es);
        assert!(html.contains("Cubos Congelados"));
        assert!(html.contains("Piña"));
    }

    #[test]
    fn unknown_product_is_an_error() {
        let (_tmp, manifest) = scanned_content();
        let err = render_page(&manifest, &Route::Product("kiwi".into()), Locale::En).unwrap_err();
        assert!(matches!(err, GenerateError::UnknownProduct(slug) if slug == "kiwi"));
    }

    #[test]
    fn content_text_is_escaped() {
        let (_tmp, mut manifest) = scanned_content();
        manifest.products[0].name.en = "<script>alert(1)</script>".to_string();
        let html = render(&manifest, Route::Products, Locale::En);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn footer_interpolates_year() {
        let (_tmp, manifest) = scanned_content();
        let html = render(&manifest, Route::Home, Locale::En);
        assert!(html.contains("© 2026 Global Gate Produce LLC"));
    }

    #[test]
    fn placeholder_certifications_get_question_badge() {
        let (_tmp, manifest) = scanned_content();
        let placeholders = manifest.certifications.iter().filter(|c| c.placeholder).count();
        let html = render(&manifest, Route::Certifications, Locale::En);
        assert_eq!(count(&html, "badge badge--placeholder"), placeholders);
        assert!(html.contains("--reveal-delay: 50ms"));
    }

    #[test]
    fn missing_images_fall_back_to_placeholders() {
        let (_tmp, manifest) = scanned_content();
        let html = render(&manifest, Route::Home, Locale::En);
        assert!(html.contains("image-placeholder"));
        assert!(!html.contains("<img"));
    }

    // =========================================================================
    // Full generation
    // =========================================================================

    #[test]
    fn generate_site_writes_every_page() {
        let (tmp, manifest) = scanned_content();
        let out = tmp.path().join("dist");
        let report = generate_site(&manifest, &out).unwrap();

        let per_locale = 3 + manifest.products.len();
        assert_eq!(report.pages.len(), per_locale * Locale::ALL.len());
        assert!(out.join("index.html").exists());
        assert!(out.join("es/index.html").exists());
        assert!(out.join("products/avocados-hass/index.html").exists());
        assert!(out.join("es/certifications/index.html").exists());
        assert!(out.join(&report.stylesheet).exists());
        assert!(out.join(report.script.as_ref().unwrap()).exists());
        assert!(out.join("favicon.svg").exists());
        assert_eq!(report.assets_copied, 1);
    }

    #[test]
    fn generate_reads_manifest_json() {
        let (tmp, manifest) = scanned_content();
        let manifest_path = tmp.path().join("manifest.json");
        fs::write(&manifest_path, serde_json::to_string(&manifest).unwrap()).unwrap();
        let out = tmp.path().join("dist");
        let report = generate(&manifest_path, &out).unwrap();
        assert!(!report.pages.is_empty());
        let home = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(home.contains(&report.stylesheet));
    }
}

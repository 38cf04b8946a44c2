//! Server-rendered pages.
//!
//! Markup follows the Polaris component structure (Page, Layout, Card,
//! Banner, Text, BlockStack) and class names, so the published Polaris
//! stylesheet styles it without the React library. The App Bridge script
//! reads the API key from `<meta name="shopify-api-key">`.
//!
//! Every dynamic value goes through [`escape_html`].

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::clients::ShopInfo;

/// App Bridge script, loaded from Shopify's CDN.
pub const APP_BRIDGE_SRC: &str = "https://cdn.shopify.com/shopifycloud/app-bridge.js";

/// Polaris stylesheet.
pub const POLARIS_CSS_HREF: &str = "https://unpkg.com/@shopify/polaris@12.27.0/build/esm/styles.css";

/// Escapes `&`, `<`, `>`, `"` and `'`.
///
/// ```rust
/// use shopify_app::server::pages::escape_html;
///
/// assert_eq!(
///     escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
///     "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
/// );
/// ```
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Date shown as "Last Updated", e.g. `10/19/2026`.
#[must_use]
pub fn last_updated(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn document(title: &str, api_key: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="shopify-api-key" content="{api_key}">
<title>{title}</title>
<script src="{APP_BRIDGE_SRC}"></script>
<link rel="stylesheet" href="{POLARIS_CSS_HREF}">
</head>
<body>
<div class="Polaris-AppProvider">
{body}
</div>
</body>
</html>
"#,
        api_key = escape_html(api_key),
        title = escape_html(title),
    )
}

fn page(title: Option<&str>, sections: &[String]) -> String {
    let mut out = String::from(r#"<div class="Polaris-Page">"#);
    if let Some(title) = title {
        let _ = write!(
            out,
            r#"<div class="Polaris-Page-Header"><h1 class="Polaris-Header-Title">{}</h1></div>"#,
            escape_html(title)
        );
    }
    out.push_str(r#"<div class="Polaris-Page__Content"><div class="Polaris-Layout">"#);
    for section in sections {
        let _ = write!(out, r#"<div class="Polaris-Layout__Section">{section}</div>"#);
    }
    out.push_str("</div></div></div>");
    out
}

fn card(content: &str) -> String {
    format!(r#"<div class="Polaris-ShadowBevel"><div class="Polaris-Box">{content}</div></div>"#)
}

fn block_stack(gap: u16, children: &[String]) -> String {
    format!(
        r#"<div class="Polaris-BlockStack" style="--pc-block-stack-gap-xs: var(--p-space-{gap})">{}</div>"#,
        children.concat()
    )
}

#[derive(Clone, Copy)]
enum Tone {
    Info,
    Success,
}

fn banner(tone: Tone, title: &str, content: &str) -> String {
    let tone = match tone {
        Tone::Info => "info",
        Tone::Success => "success",
    };
    format!(
        r#"<div class="Polaris-Banner Polaris-Banner--{tone}" role="status"><h2 class="Polaris-Text--root Polaris-Text--headingSm">{}</h2><div class="Polaris-Banner__Content">{content}</div></div>"#,
        escape_html(title)
    )
}

fn heading(level: u8, variant: &str, text: &str) -> String {
    format!(
        r#"<h{level} class="Polaris-Text--root Polaris-Text--{variant}">{}</h{level}>"#,
        escape_html(text)
    )
}

/// Paragraph. `inner` must already be escaped.
fn text(inner: &str) -> String {
    format!(r#"<p class="Polaris-Text--root Polaris-Text--bodyMd">{inner}</p>"#)
}

/// Paragraph with a bold label and an escaped value.
fn labelled(label: &str, value: &str) -> String {
    text(&format!(
        "<strong>{}</strong> {}",
        escape_html(label),
        escape_html(value)
    ))
}

/// Bullet list. `items` must already be escaped.
fn list(items: &[&str]) -> String {
    let mut out = String::from("<ul>");
    for item in items {
        let _ = write!(out, "<li>{item}</li>");
    }
    out.push_str("</ul>");
    out
}

/// Shown when the app is opened without a `shop` parameter.
#[must_use]
pub fn welcome_page(api_key: &str, app_url: &str) -> String {
    let app_url = escape_html(app_url);
    let content = block_stack(
        400,
        &[
            heading(2, "headingMd", "Welcome to Your Shopify App"),
            banner(
                Tone::Info,
                "Development Mode",
                &block_stack(
                    200,
                    &[
                        text("To use this app, you need to access it through Shopify Admin or with a shop parameter."),
                        text("<strong>For local development:</strong>"),
                        list(&[
                            "Use Shopify CLI: <code>shopify app dev</code>",
                            format!("Or access with: <code>{app_url}?shop=your-store.myshopify.com</code>")
                                .as_str(),
                            "Or install the app through the Shopify Partner Dashboard",
                        ]),
                        text(&format!(
                            "The server is running successfully at <code>{app_url}</code>"
                        )),
                    ],
                ),
            ),
        ],
    );

    document(
        "Shopify App - Development",
        api_key,
        &page(Some("Shopify App - Development"), &[card(&content)]),
    )
}

/// Home screen of an installed shop.
///
/// The shop information card is left out when `shop_info` is `None`.
#[must_use]
pub fn dashboard_page(api_key: &str, shop_info: Option<&ShopInfo>) -> String {
    let mut sections = vec![banner(
        Tone::Success,
        "App is successfully installed!",
        &text("Your Shopify app is now connected and ready to use."),
    )];

    if let Some(info) = shop_info {
        let mut details = vec![
            labelled("Shop Name:", &info.name),
            labelled("Shop Domain:", &info.domain),
        ];
        if !info.email.is_empty() {
            details.push(labelled("Email:", &info.email));
        }
        if !info.plan_display_name.is_empty() {
            details.push(labelled("Plan:", &info.plan_display_name));
        }
        sections.push(card(&block_stack(
            400,
            &[
                heading(2, "headingMd", "Shop Information"),
                block_stack(200, &details),
            ],
        )));
    }

    sections.push(card(&block_stack(
        400,
        &[
            heading(2, "headingMd", "Next Steps"),
            block_stack(
                200,
                &[
                    text("1. Customize this app to add your specific features"),
                    text("2. Configure webhooks for your app&#39;s needs"),
                    text("3. Add your app logic and business requirements"),
                    text("4. Test thoroughly before submitting to Shopify App Store"),
                ],
            ),
        ],
    )));

    document(
        "Welcome to Your Shopify App",
        api_key,
        &page(Some("Welcome to Your Shopify App"), &sections),
    )
}

/// One titled block of a legal page.
struct Clause<'a> {
    title: &'a str,
    paragraphs: &'a [&'a str],
    items: &'a [&'a str],
    closing: Option<&'a str>,
}

impl Clause<'_> {
    fn render(&self) -> String {
        let mut children = vec![heading(3, "headingSm", self.title)];
        children.extend(self.paragraphs.iter().map(|p| text(&escape_html(p))));
        if !self.items.is_empty() {
            let escaped: Vec<String> = self.items.iter().map(|i| escape_html(i)).collect();
            let refs: Vec<&str> = escaped.iter().map(String::as_str).collect();
            children.push(list(&refs));
        }
        if let Some(closing) = self.closing {
            children.push(text(&escape_html(closing)));
        }
        block_stack(200, &children)
    }
}

fn legal_page(title: &str, api_key: &str, date: NaiveDate, clauses: &[Clause<'_>]) -> String {
    let mut children = vec![
        heading(2, "headingMd", title),
        labelled("Last Updated:", &last_updated(date)),
    ];
    children.extend(clauses.iter().map(Clause::render));

    document(
        &format!("{title} - Shopify App"),
        api_key,
        &page(Some(title), &[card(&block_stack(400, &children))]),
    )
}

/// Privacy policy, dated `date`.
#[must_use]
pub fn privacy_page(api_key: &str, date: NaiveDate) -> String {
    legal_page(
        "Privacy Policy",
        api_key,
        date,
        &[
            Clause {
                title: "Information We Collect",
                paragraphs: &["Our Shopify app collects and stores the following information:"],
                items: &[
                    "Shop information (name, domain, email, plan)",
                    "OAuth access tokens for API access",
                    "App-specific data configured by the merchant",
                ],
                closing: None,
            },
            Clause {
                title: "How We Use Your Information",
                paragraphs: &["We use the collected information to:"],
                items: &[
                    "Provide and maintain the app's functionality",
                    "Communicate with you about your account",
                    "Improve our services",
                    "Comply with legal obligations",
                ],
                closing: None,
            },
            Clause {
                title: "Data Security",
                paragraphs: &["We implement appropriate security measures to protect your data. \
                    Access tokens are stored securely in our database and are encrypted \
                    at rest. We do not share your data with third parties except as \
                    required by law."],
                items: &[],
                closing: None,
            },
            Clause {
                title: "Your Rights (GDPR)",
                paragraphs: &["Under GDPR, you have the right to:"],
                items: &[
                    "Request access to your personal data",
                    "Request correction of inaccurate data",
                    "Request deletion of your data",
                    "Object to processing of your data",
                    "Request data portability",
                ],
                closing: Some(
                    "To exercise these rights, please contact us through the support \
                    email provided in the app listing.",
                ),
            },
            Clause {
                title: "Data Retention",
                paragraphs: &["We retain your data as long as your app is installed. When you \
                    uninstall the app, we delete all associated data within 30 days, \
                    unless required to retain it for legal purposes."],
                items: &[],
                closing: None,
            },
            Clause {
                title: "Changes to This Policy",
                paragraphs: &["We may update this privacy policy from time to time. We will \
                    notify you of any changes by posting the new policy on this page \
                    and updating the \"Last Updated\" date."],
                items: &[],
                closing: None,
            },
            Clause {
                title: "Contact Us",
                paragraphs: &["If you have questions about this privacy policy, please contact \
                    us through the support email provided in the Shopify App Store listing."],
                items: &[],
                closing: None,
            },
        ],
    )
}

/// Terms of service, dated `date`.
#[must_use]
pub fn terms_page(api_key: &str, date: NaiveDate) -> String {
    legal_page(
        "Terms of Service",
        api_key,
        date,
        &[
            Clause {
                title: "Acceptance of Terms",
                paragraphs: &["By installing and using this Shopify app, you agree to be bound \
                    by these Terms of Service. If you do not agree to these terms, \
                    please do not use the app."],
                items: &[],
                closing: None,
            },
            Clause {
                title: "Description of Service",
                paragraphs: &["This app provides services that integrate with your Shopify store. \
                    The specific features and functionality are described in the app \
                    listing on the Shopify App Store."],
                items: &[],
                closing: None,
            },
            Clause {
                title: "Use License",
                paragraphs: &["Permission is granted to temporarily use this app for personal or \
                    commercial purposes. This license is subject to the following \
                    restrictions:"],
                items: &[
                    "You may not modify or copy the app's code",
                    "You may not use the app for any unlawful purpose",
                    "You may not attempt to gain unauthorized access to the app",
                ],
                closing: None,
            },
            Clause {
                title: "User Responsibilities",
                paragraphs: &["You are responsible for:"],
                items: &[
                    "Maintaining the security of your Shopify account",
                    "All activities that occur under your account",
                    "Ensuring your use of the app complies with applicable laws",
                    "Backing up your data",
                ],
                closing: None,
            },
            Clause {
                title: "Service Availability",
                paragraphs: &["We strive to provide reliable service but do not guarantee that \
                    the app will be available 100% of the time. The app may be \
                    temporarily unavailable due to maintenance, updates, or unforeseen \
                    circumstances. We are not liable for any loss or damage resulting \
                    from service unavailability."],
                items: &[],
                closing: None,
            },
            Clause {
                title: "Limitation of Liability",
                paragraphs: &["To the maximum extent permitted by law, we shall not be liable \
                    for any indirect, incidental, special, consequential, or punitive \
                    damages, or any loss of profits or revenues, whether incurred \
                    directly or indirectly, or any loss of data, use, goodwill, or \
                    other intangible losses resulting from your use of the app."],
                items: &[],
                closing: None,
            },
            Clause {
                title: "Termination",
                paragraphs: &["We reserve the right to terminate or suspend your access to the \
                    app immediately, without prior notice, for any reason, including \
                    if you breach these Terms of Service. Upon termination, your right \
                    to use the app will cease immediately."],
                items: &[],
                closing: None,
            },
            Clause {
                title: "Changes to Terms",
                paragraphs: &["We reserve the right to modify these terms at any time. We will \
                    notify users of any material changes by updating the \"Last Updated\" \
                    date. Your continued use of the app after changes constitutes \
                    acceptance of the new terms."],
                items: &[],
                closing: None,
            },
            Clause {
                title: "Governing Law",
                paragraphs: &["These Terms of Service shall be governed by and construed in \
                    accordance with the laws of the jurisdiction in which the app \
                    developer is located, without regard to its conflict of law provisions."],
                items: &[],
                closing: None,
            },
            Clause {
                title: "Contact Information",
                paragraphs: &["If you have any questions about these Terms of Service, please \
                    contact us through the support email provided in the Shopify App Store listing."],
                items: &[],
                closing: None,
            },
        ],
    )
}

//! Post-processing of generated article text.
//!
//! Everything here is an ordered list of named transformation stages executed
//! exactly once per generated text. Each stage declares whether it is
//! idempotent; stages that insert or append content (hero header, summary
//! links, related pages, author box) are not, and rely on the
//! run-exactly-once contract. Idempotent stages are covered by
//! double-application tests.

mod breaks;
mod sanitize;
mod sections;
mod tokens;

use std::collections::HashMap;

use data_model_yado::models::{Author, Hotel, PageData};

pub use breaks::apply_dialogue_breaks;
pub use sanitize::sanitize_text;
pub use sections::extract_title;

/// Affiliate link settings used when rendering hotel links and CTAs.
#[derive(Debug, Clone, Default)]
pub struct AffiliateConfig {
    /// Empty means direct (non-affiliate) links.
    pub affiliate_id: String,
}

/// Context for one article's post-processing run: the resolved entity data
/// every stage draws from.
pub struct PostProcessor {
    pub page_id: i32,
    /// Hotels the model selected, keyed by exact name.
    pub hotels: HashMap<String, Hotel>,
    pub affiliate: AffiliateConfig,
    pub author: Option<Author>,
    pub related_pages: Vec<PageData>,
    pub site_base_url: String,
    pub media_base_url: String,
    pub hero_image_url: Option<String>,
    pub area_name: String,
}

/// One named transformation over the article text.
pub struct Stage {
    pub name: &'static str,
    pub idempotent: bool,
    run: fn(&PostProcessor, &str) -> String,
}

impl Stage {
    pub fn apply(&self, ctx: &PostProcessor, text: &str) -> String {
        (self.run)(ctx, text)
    }
}

/// The pipeline, in execution order. Order carries dependencies: dialogue and
/// sanitizer passes run before any HTML is injected, token replacement before
/// the summary-link pass, and the append-only sections last.
pub const STAGES: &[Stage] = &[
    Stage {
        name: "strip-preamble",
        idempotent: true,
        run: sections::strip_preamble,
    },
    Stage {
        name: "strip-section-numbers",
        idempotent: true,
        run: sections::strip_section_numbers,
    },
    Stage {
        name: "dialogue-breaks",
        idempotent: true,
        run: breaks::dialogue_breaks,
    },
    Stage {
        name: "sanitize",
        idempotent: true,
        run: sanitize::sanitize,
    },
    Stage {
        name: "hero-image",
        idempotent: false,
        run: sections::hero_image,
    },
    Stage {
        name: "hotel-links",
        idempotent: true,
        run: tokens::hotel_links,
    },
    Stage {
        name: "hotel-images",
        idempotent: true,
        run: tokens::hotel_images,
    },
    Stage {
        name: "cta-buttons",
        idempotent: true,
        run: tokens::cta_buttons,
    },
    Stage {
        name: "area-cta",
        idempotent: true,
        run: tokens::area_cta,
    },
    Stage {
        name: "access-links",
        idempotent: true,
        run: tokens::access_links,
    },
    Stage {
        name: "review-blocks",
        idempotent: true,
        run: tokens::review_blocks,
    },
    Stage {
        name: "summary-links",
        idempotent: false,
        run: sections::summary_hotel_links,
    },
    Stage {
        name: "related-pages",
        idempotent: false,
        run: sections::related_pages_section,
    },
    Stage {
        name: "author-section",
        idempotent: false,
        run: sections::author_section,
    },
    Stage {
        name: "title-count",
        idempotent: true,
        run: sections::title_hotel_count,
    },
];

impl PostProcessor {
    /// Runs every stage once, in order.
    pub fn process(&self, content: &str) -> String {
        let mut text = content.to_string();
        for stage in STAGES {
            let bytes_before = text.len();
            text = stage.apply(self, &text);
            tracing::debug!(stage = stage.name, bytes_before, bytes_after = text.len(), "applied stage");
        }
        text
    }

    /// Booking URL for a hotel: affiliate-wrapped when an affiliate id is
    /// configured, the direct hotel page otherwise.
    pub fn booking_url(&self, hotel: &Hotel) -> String {
        if self.affiliate.affiliate_id.is_empty() {
            format!("https://travel.rakuten.co.jp/HOTEL/{}/", hotel.hotel_no)
        } else {
            format!(
                "https://hb.afl.rakuten.co.jp/hgc/{}/?pc=https%3A%2F%2Ftravel.rakuten.co.jp%2FHOTEL%2F{}%2F",
                self.affiliate.affiliate_id, hotel.hotel_no
            )
        }
    }

    /// URL of a hotel's full review listing.
    pub fn review_listing_url(&self, hotel: &Hotel) -> String {
        if self.affiliate.affiliate_id.is_empty() {
            format!("https://travel.rakuten.co.jp/HOTEL/{}/review.html", hotel.hotel_no)
        } else {
            format!(
                "https://hb.afl.rakuten.co.jp/hgc/{}/?pc=https%3A%2F%2Ftravel.rakuten.co.jp%2FHOTEL%2F{}%2Freview.html",
                self.affiliate.affiliate_id, hotel.hotel_no
            )
        }
    }
}

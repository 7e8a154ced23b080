use std::fmt;

/// Processing states an entry moves through, strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Fetched,
    Keyed,
    Skipped,
    LinksStripped,
    ImagesRehosted,
    TitleTranslated,
    BodyTranslated,
    Published,
    Recorded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetched => "fetched",
            Stage::Keyed => "keyed",
            Stage::Skipped => "skipped",
            Stage::LinksStripped => "links-stripped",
            Stage::ImagesRehosted => "images-rehosted",
            Stage::TitleTranslated => "title-translated",
            Stage::BodyTranslated => "body-translated",
            Stage::Published => "published",
            Stage::Recorded => "recorded",
        };
        f.write_str(name)
    }
}

//! Choosing which discovered pages to fetch.

use bizprofile_core::SiteUrl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRole {
    Home,
    About,
    Contact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPage {
    pub role: PageRole,
    pub url: SiteUrl,
}

/// Pick at most one page per role.
///
/// The first URL is `home`. Of the rest, the first whose URL contains
/// "about" (case-insensitive) is `about` and the first containing "contact"
/// is `contact`. Missing roles are omitted, never padded.
#[must_use]
pub fn select(urls: &[SiteUrl]) -> Vec<SelectedPage> {
    let Some((home, rest)) = urls.split_first() else {
        return Vec::new();
    };
    let mut selected = vec![SelectedPage {
        role: PageRole::Home,
        url: home.clone(),
    }];

    let mut pick = |role: PageRole, needle: &str| {
        let found = rest.iter().find(|url| {
            url.as_str().to_ascii_lowercase().contains(needle)
                && !selected.iter().any(|page| &page.url == *url)
        });
        if let Some(url) = found {
            selected.push(SelectedPage {
                role,
                url: url.clone(),
            });
        }
    };
    pick(PageRole::About, "about");
    pick(PageRole::Contact, "contact");

    selected
}

/// `base` followed by `discovered` minus any entry equal to `base`, so the
/// input URL is always the home page.
#[must_use]
pub fn home_first(base: &SiteUrl, discovered: &[SiteUrl]) -> Vec<SiteUrl> {
    std::iter::once(base.clone())
        .chain(discovered.iter().filter(|url| *url != base).cloned())
        .collect()
}

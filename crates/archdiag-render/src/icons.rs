//! Built-in icon glyphs.
//!
//! Each body is drawn in an `80 x 80` user space and placed with a `translate` + `scale`
//! transform, so it can be embedded inline without nested `<svg>` documents.

use archdiag_core::IconCategory;

/// Edge length of the glyph coordinate space.
pub const ICON_VIEWBOX: f64 = 80.0;

const AZURE_BLUE: &str = "#0078D4";
const AZURE_LIGHT: &str = "#50E6FF";
const ONPREM_GRAY: &str = "#5A6872";

pub fn icon_body(icon: IconCategory) -> String {
    match icon {
        IconCategory::Vm => monitor(AZURE_BLUE, ""),
        IconCategory::VmWindows => monitor(
            AZURE_BLUE,
            r##"<rect x="29" y="19" width="10" height="10" fill="#fff"/><rect x="41" y="19" width="10" height="10" fill="#fff"/><rect x="29" y="31" width="10" height="10" fill="#fff"/><rect x="41" y="31" width="10" height="10" fill="#fff"/>"##,
        ),
        IconCategory::Disks => format!(
            r##"<g><path d="M16,22 v36 c0,6 48,6 48,0 v-36" fill="{AZURE_BLUE}"/><ellipse cx="40" cy="22" rx="24" ry="7" fill="{AZURE_LIGHT}"/><path d="M16,34 c0,6 48,6 48,0 M16,46 c0,6 48,6 48,0" fill="none" stroke="#fff" stroke-width="2"/></g>"##
        ),
        IconCategory::CloudServicesClassic => cloud(AZURE_BLUE, ""),
        IconCategory::HostPool => format!(
            r##"<g><rect x="10" y="12" width="60" height="16" rx="3" fill="{AZURE_BLUE}"/><rect x="10" y="32" width="60" height="16" rx="3" fill="{AZURE_BLUE}"/><rect x="10" y="52" width="60" height="16" rx="3" fill="{AZURE_BLUE}"/><circle cx="20" cy="20" r="3" fill="{AZURE_LIGHT}"/><circle cx="20" cy="40" r="3" fill="{AZURE_LIGHT}"/><circle cx="20" cy="60" r="3" fill="{AZURE_LIGHT}"/><path d="M30,20 h32 M30,40 h32 M30,60 h32" stroke="#fff" stroke-width="2"/></g>"##
        ),
        IconCategory::Workspace => format!(
            r##"<g><rect x="8" y="14" width="64" height="44" rx="4" fill="{AZURE_BLUE}"/><rect x="14" y="22" width="24" height="14" fill="{AZURE_LIGHT}"/><rect x="42" y="22" width="24" height="14" fill="#fff"/><rect x="14" y="40" width="52" height="12" fill="#fff" opacity="0.8"/><path d="M30,66 h20" stroke="{AZURE_BLUE}" stroke-width="4" stroke-linecap="round"/></g>"##
        ),
        IconCategory::ApplicationGroup => format!(
            r##"<g><rect x="10" y="10" width="27" height="27" rx="4" fill="{AZURE_BLUE}"/><rect x="43" y="10" width="27" height="27" rx="4" fill="{AZURE_LIGHT}"/><rect x="10" y="43" width="27" height="27" rx="4" fill="{AZURE_LIGHT}"/><rect x="43" y="43" width="27" height="27" rx="4" fill="{AZURE_BLUE}"/></g>"##
        ),
        IconCategory::VirtualNetworks => format!(
            r##"<g><path d="M26,20 L8,40 L26,60" fill="none" stroke="{AZURE_BLUE}" stroke-width="7" stroke-linejoin="round"/><path d="M54,20 L72,40 L54,60" fill="none" stroke="{AZURE_BLUE}" stroke-width="7" stroke-linejoin="round"/><circle cx="28" cy="40" r="5" fill="{AZURE_LIGHT}"/><circle cx="40" cy="40" r="5" fill="{AZURE_LIGHT}"/><circle cx="52" cy="40" r="5" fill="{AZURE_LIGHT}"/></g>"##
        ),
        IconCategory::Subnets => format!(
            r##"<g><rect x="10" y="16" width="60" height="48" rx="3" fill="none" stroke="{AZURE_BLUE}" stroke-width="4"/><path d="M10,32 h60 M10,48 h60" stroke="{AZURE_BLUE}" stroke-width="2"/><circle cx="22" cy="24" r="3" fill="{AZURE_LIGHT}"/><circle cx="22" cy="40" r="3" fill="{AZURE_LIGHT}"/><circle cx="22" cy="56" r="3" fill="{AZURE_LIGHT}"/></g>"##
        ),
        IconCategory::NetworkSecurityGroupsClassic => format!(
            r##"<g><path d="M40,8 L68,18 v20 c0,18 -12,28 -28,34 c-16,-6 -28,-16 -28,-34 v-20 Z" fill="{AZURE_BLUE}"/><path d="M40,16 L60,23 v15 c0,13 -9,21 -20,25 Z" fill="{AZURE_LIGHT}"/></g>"##
        ),
        IconCategory::ResourceGroups => format!(
            r##"<g><path d="M18,12 h-8 v56 h8 M62,12 h8 v56 h-8" fill="none" stroke="{ONPREM_GRAY}" stroke-width="4"/><path d="M40,20 L58,30 v20 L40,60 L22,50 v-20 Z" fill="{AZURE_BLUE}"/><path d="M22,30 L40,40 L58,30 M40,40 v20" fill="none" stroke="#fff" stroke-width="2"/></g>"##
        ),
        IconCategory::Users => format!(
            r##"<g><circle cx="30" cy="28" r="11" fill="{AZURE_BLUE}"/><path d="M10,66 c0,-14 9,-22 20,-22 s20,8 20,22 Z" fill="{AZURE_BLUE}"/><circle cx="52" cy="24" r="9" fill="{AZURE_LIGHT}"/><path d="M38,40 c3,-3 8,-5 14,-5 c10,0 18,7 18,20 h-20" fill="{AZURE_LIGHT}"/></g>"##
        ),
        IconCategory::User => person(ONPREM_GRAY, ""),
        IconCategory::ClientUsers => person(
            ONPREM_GRAY,
            r##"<rect x="50" y="46" width="24" height="16" rx="2" fill="#fff" stroke="#5A6872" stroke-width="3"/><path d="M56,68 h12" stroke="#5A6872" stroke-width="3"/>"##,
        ),
        IconCategory::Blank => "<g/>".to_string(),
    }
}

fn monitor(color: &str, inner: &str) -> String {
    format!(
        r##"<g><rect x="8" y="10" width="64" height="42" rx="3" fill="{color}"/><path d="M32,52 l-4,12 h24 l-4,-12 Z" fill="{ONPREM_GRAY}"/><rect x="22" y="64" width="36" height="4" rx="2" fill="{ONPREM_GRAY}"/>{inner}</g>"##
    )
}

fn cloud(color: &str, inner: &str) -> String {
    format!(
        r##"<g><path d="M62,58 H20 c-7,0 -12,-5 -12,-11 c0,-6 5,-11 11,-11 c1,-9 8,-15 17,-15 c7,0 13,4 16,10 c1,0 2,0 3,0 c7,0 13,6 13,13 c0,8 -6,14 -6,14 Z" fill="{color}"/>{inner}</g>"##
    )
}

fn person(color: &str, inner: &str) -> String {
    format!(
        r##"<g><circle cx="34" cy="24" r="13" fill="{color}"/><path d="M10,70 c0,-17 11,-26 24,-26 s24,9 24,26 Z" fill="{color}"/>{inner}</g>"##
    )
}

/// Full `<g>` element drawing `icon` with its top-left corner at `(x, y)` and edge `size`.
pub fn icon_group(icon: IconCategory, x: f64, y: f64, size: f64) -> String {
    format!(
        r#"<g class="icon icon-{name}" transform="translate({x} {y}) scale({s})">{body}</g>"#,
        name = icon.name(),
        x = crate::svg::fmt(x),
        y = crate::svg::fmt(y),
        s = crate::svg::fmt(size / ICON_VIEWBOX),
        body = icon_body(icon),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_a_glyph() {
        for icon in IconCategory::ALL {
            let body = icon_body(icon);
            assert!(body.starts_with("<g"), "{icon:?}");
            assert!(body.ends_with("/>") || body.ends_with("</g>"), "{icon:?}");
        }
    }

    #[test]
    fn groups_scale_from_the_glyph_space() {
        let g = icon_group(IconCategory::Subnets, 10.0, 20.0, 40.0);
        assert!(g.contains(r#"transform="translate(10 20) scale(0.5)""#));
        assert!(g.contains("icon-subnets"));
    }
}

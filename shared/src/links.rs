//! Outbound payloads built from a fix: the platform maps URI and the share
//! sheet content.

use url::Url;

use crate::capabilities::{LocationFix, ShareContent};
use crate::model::Platform;
use crate::{CoreError, GOOGLE_MAPS_SEARCH_URL, MAPS_PIN_LABEL, SHARE_TITLE};

fn lat_lng(fix: &LocationFix) -> String {
    format!("{},{}", fix.latitude, fix.longitude)
}

/// Search URL understood by every platform's browser.
pub fn google_maps_url(fix: &LocationFix) -> Result<Url, CoreError> {
    let mut url = Url::parse(GOOGLE_MAPS_SEARCH_URL)?;
    url.set_query(Some(&format!("api=1&query={}", lat_lng(fix))));
    Ok(url)
}

/// URI that opens the platform's native maps application with a labelled pin.
pub fn maps_app_url(platform: Platform, fix: &LocationFix) -> Result<Url, CoreError> {
    let raw = match platform {
        Platform::Ios => format!("maps:0,0?q={MAPS_PIN_LABEL}@{}", lat_lng(fix)),
        Platform::Android => format!("geo:0,0?q={}({MAPS_PIN_LABEL})", lat_lng(fix)),
        Platform::Web | Platform::Unknown => return google_maps_url(fix),
    };
    Ok(Url::parse(&raw)?)
}

pub fn share_content(fix: &LocationFix) -> Result<ShareContent, CoreError> {
    let url = google_maps_url(fix)?.to_string();
    Ok(ShareContent {
        message: format!("Here is my current location: {url}"),
        url,
        title: SHARE_TITLE.to_string(),
    })
}

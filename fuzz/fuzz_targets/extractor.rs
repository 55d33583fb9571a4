#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use sourcegate::extractor::extract_from_html;
use sourcegate::fetcher::pipeline::process_response;
use sourcegate::scanner::{is_sole_url, scan};

fuzz_target!(|data: &[u8]| {
    let page_url = Url::parse("https://www.reuters.com/world/story").unwrap();

    // Charset sniffing and decoding must accept arbitrary bytes.
    let page = process_response(
        page_url.clone(),
        reqwest::StatusCode::OK,
        bytes::Bytes::copy_from_slice(data),
        "text/html",
    );

    // Neither the heuristics nor the link scanner may panic on any input.
    let _ = extract_from_html(&page.body_utf8, &page_url);
    let _ = scan(&page.body_utf8);
    let _ = is_sole_url(&page.body_utf8);
});

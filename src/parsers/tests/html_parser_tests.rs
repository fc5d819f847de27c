use crate::parsers::html::{self, ImageTag};

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en-GB">
  <head>
    <title>  Handmade   Leather Boots </title>
    <meta name="description" content="Boots stitched by hand in our workshop.">
  </head>
  <body>
    <h1>Leather <em>Boots</em></h1>
    <h2>Sizing</h2>
    <h2>   </h2>
    <h2>Care</h2>
    <img src="https://cdn.example.com/boot.jpg" alt="Brown boot">
    <img src="/img/sole.png">
    <img src="https://cdn.example.com/lace.jpg" alt="">
    <a href="/shop">Shop</a>
    <a href="https://example.com/about#team">About</a>
    <a name="anchor-without-href">Top</a>
  </body>
</html>"#;

    #[test]
    fn test_extract_meta() {
        let meta = html::extract_meta(PAGE);
        assert_eq!(meta.title, "Handmade Leather Boots");
        assert_eq!(meta.description, "Boots stitched by hand in our workshop.");
        assert_eq!(meta.lang, "en-GB");
    }

    #[test]
    fn test_extract_meta_defaults_to_sentinel() {
        let meta = html::extract_meta("<html><body><p>No head at all</p></body></html>");
        assert_eq!(meta.title, "N/A");
        assert_eq!(meta.description, "N/A");
        assert_eq!(meta.lang, "N/A");
    }

    #[test]
    fn test_meta_description_is_trimmed() {
        let meta = html::extract_meta(
            r#"<html><head><meta name="description" content="   Short and padded.   "></head></html>"#,
        );
        assert_eq!(meta.description, "Short and padded.");
    }

    #[test]
    fn test_meta_description_without_content_is_missing() {
        let meta = html::extract_meta(r#"<html><head><meta name="description"></head></html>"#);
        assert_eq!(meta.description, "N/A");
    }

    #[test]
    fn test_extract_headers_skips_blank_headings() {
        let headings = html::extract_headers(PAGE);
        assert_eq!(headings.h1, vec!["Leather Boots".to_string()]);
        assert_eq!(headings.h2, vec!["Sizing".to_string(), "Care".to_string()]);
    }

    #[test]
    fn test_page_without_h1_yields_single_missing_record() {
        let headings = html::extract_headers("<html><body><h2>Only a subheading</h2></body></html>");
        assert_eq!(headings.h1, vec!["Missing".to_string()]);
        assert_eq!(headings.h2, vec!["Only a subheading".to_string()]);

        let headings = html::extract_headers("<html><body><h1> </h1></body></html>");
        assert_eq!(headings.h1, vec!["Missing".to_string()]);
        assert_eq!(headings.h2, vec!["Missing".to_string()]);
    }

    #[test]
    fn test_extract_images() {
        let images = html::extract_images(PAGE);
        assert_eq!(images.len(), 3);
        assert!(!images[0].is_missing_alt());
        assert!(images[1].is_missing_alt());
        assert!(images[2].is_missing_alt());

        assert_eq!(images[0].sized_source(), Some("https://cdn.example.com/boot.jpg"));
        assert_eq!(images[1].sized_source(), None);
    }

    #[test]
    fn test_image_without_src_is_never_size_checked() {
        let image = ImageTag {
            src: None,
            alt: None,
        };
        assert!(image.is_missing_alt());
        assert_eq!(image.sized_source(), None);
    }

    #[test]
    fn test_extract_links_only_takes_hrefs() {
        let links = html::extract_links(PAGE);
        assert_eq!(
            links,
            vec!["/shop".to_string(), "https://example.com/about#team".to_string()]
        );
    }

    #[test]
    fn test_parse_page_combines_everything() {
        let page = html::parse_page(PAGE);
        assert_eq!(page.meta.title, "Handmade Leather Boots");
        assert_eq!(page.headings.h2.len(), 2);
        assert_eq!(page.images.len(), 3);
    }
}

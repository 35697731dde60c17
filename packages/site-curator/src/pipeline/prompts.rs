//! Oracle prompts, one per query kind.
//!
//! Page text always goes last so that truncating an overlong prompt cuts the
//! page, never the instructions.

/// Prompt asking whether page text is an official single-product page.
pub const CHECK_PRODUCT_PAGE_PROMPT: &str = "You will be given the raw text extracted from a webpage. \
Your goal is to determine if this page is likely an OFFICIAL product page that contains a SINGLE {product} product. \
If the page is likely an official SINGLE product page for {product}, return 'True'. \
If this page is likely a catalog page or a lineup introduction page where multiple products (or a product family) are listed, \
say 'False' and give me the name of one of the listed {product} products after a line break. \
If this page does not exist, or is a non-official third-party site, or is unlikely a {product} product page \
(or not a product page at all), return 'False'.
The page is: {text}";

/// Prompt asking what a page's real model name is.
pub const UPDATE_MODEL_NAME_PROMPT: &str = "Consider a webpage, whose title is {title}, and the URL is {url}. \
This is a product webpage for a {product} from the brand {brand}. \
The product model name could be {model}, but this may be incorrect. \
Your goal is to determine the actual model name of this product based on the provided information. \
Your output should be the model name, followed by the reasoning of the answer after a line break. \
Note that the first line of your answer should only mention the model name (include the product series if applicable), \
and should not include the brand name or the type of product (i.e., don't explicitly mention '{product}'). \
If the title is uninformative and you are unable to decide based on the title and the URL, say 'title uninformative'.";

/// Prompt asking whether a URL looks like an official single-product page.
pub const CHECK_URL_PROMPT: &str = "Here is a URL: {url}.
Determine if it likely points to an OFFICIAL product page that contains a single {product} product. \
If the page is likely an official single product page for a {product}, return 'True' and say the reason after a line break. \
If you are VERY certain that this URL points to a non-official third-party site or is not for a {product}, \
return 'False' and say the reason after a line break. \
If you are VERY certain that this URL points to an official catalog page or a lineup introduction page, \
return 'Catalog' and say the reason after a line break. \
If you are not sure, say 'Unsure'.";

/// Prompt asking whether a URL prefix belongs to a brand.
pub const CHECK_URL_BRAND_PROMPT: &str = "Does a URL beginning with {url} likely point to an official website of the brand {brand}? \
Return 'True' or 'False' and no extra words.";

/// Prompt asking for one product name from a catalog page.
pub const FIND_IN_CATALOG_PROMPT: &str = "You will be given the raw text extracted from a product catalog page. \
Return the name of one single {product} product in this page without any extra words.
The page is: {text}";

/// Format the single-product page check.
pub fn format_check_product_page_prompt(product: &str, text: &str) -> String {
    CHECK_PRODUCT_PAGE_PROMPT
        .replace("{product}", product)
        .replace("{text}", text)
}

/// Format the model-name refresh question.
pub fn format_update_model_name_prompt(
    product: &str,
    brand: &str,
    model: &str,
    title: &str,
    url: &str,
) -> String {
    UPDATE_MODEL_NAME_PROMPT
        .replace("{product}", product)
        .replace("{brand}", brand)
        .replace("{model}", model)
        .replace("{url}", url)
        .replace("{title}", title)
}

/// Format the URL check. The scheme and any `.html` suffix are dropped.
pub fn format_check_url_prompt(product: &str, url: &str) -> String {
    CHECK_URL_PROMPT
        .replace("{product}", product)
        .replace("{url}", url_for_prompt(url))
}

/// Format the brand-ownership check.
pub fn format_check_url_brand_prompt(brand: &str, url: &str) -> String {
    CHECK_URL_BRAND_PROMPT
        .replace("{brand}", brand)
        .replace("{url}", url)
}

/// Format the catalog extraction question.
pub fn format_find_in_catalog_prompt(product: &str, text: &str) -> String {
    FIND_IN_CATALOG_PROMPT
        .replace("{product}", product)
        .replace("{text}", text)
}

fn url_for_prompt(url: &str) -> &str {
    let rest = url.rsplit_once("://").map_or(url, |(_, rest)| rest);
    rest.split(".html").next().unwrap_or(rest)
}

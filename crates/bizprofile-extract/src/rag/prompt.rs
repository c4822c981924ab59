//! The extraction prompt.

/// Fixed retrieval query describing the fields the prompt asks for.
pub const RETRIEVAL_QUERY: &str =
    "company name, about us, services, contact information, email, phone, office address, location";

const FIELDS: &str = r#"Extract the following fields:

1. businessName: the official company or business name (string)
2. aboutUs: a brief description of the company in 2-3 sentences (string)
3. mainServices: services offered (array of strings)
4. email: all business email addresses (array of strings)
5. phone: all business phone numbers (array of strings)
6. address: ONLY complete physical office or business addresses (array of strings)
   - MUST include street number, street or building name, area or locality, city and region
   - MUST contain an address keyword such as Street, Road, Complex, Building, Mall, Highway, Avenue, Lane, Square, Nagar, Society, Floor, Suite or Office
   - DO NOT include business hours, dates or years, review counts or ratings, social media text, phone numbers on their own, promotional text, or incomplete fragments

   Valid addresses:
   - "306, Surmount Complex, Opposite Iscon Mega Mall, Sarkhej-Gandhinagar Highway, Near Baleshwar Square, Ahmedabad, Gujarat 380054"
   - "1234 Main Street, Suite 500, Downtown, New York, NY 10001"

   Invalid, never extract:
   - "10:00 AM - 7:00 PM Monday - Saturday"
   - "267 reviews Google Reviews"
   - "+91 76002 16429"
   - "Follow Us ARE InfoTech"
   - "2017 Category Skin Care Clinical"

7. facebook: Facebook page URL (string)
8. instagram: Instagram profile URL (string)
9. linkedin: LinkedIn company page URL (string)
10. twitterX: Twitter / X profile URL (string)
11. description: a 2-3 sentence description of what the business does (string)"#;

const RULES: &str = r#"Rules:
- Return only information supported by the content below.
- Be strict with addresses: only complete physical locations.
- Use "" for a string field and [] for an array field with no evidence.
- Respond with a single JSON object using exactly the field names above.
- No markdown, no code fences, no commentary."#;

/// Build the prompt for `site_url` over the retrieved `context`.
#[must_use]
pub fn build_prompt(site_url: &str, context: &str) -> String {
    format!(
        "You extract accurate business information from website content.\n\n\
         {FIELDS}\n\
         12. url: {site_url}\n\n\
         {RULES}\n\n\
         Website content:\n\n\
         {context}\n"
    )
}

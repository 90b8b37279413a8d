use crate::config::Config;
use crate::models::{DesignHints, GenerateRequest};
use crate::theme::Theme;

/// Fixed system instruction sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are an expert web developer who generates complete, \
    production-ready HTML/CSS/JS code. Always return valid JSON only.";

const DEFAULT_PAGES: [&str; 5] = ["index", "about", "services", "pricing", "contact"];

/// Pages to generate: the caller's list, or the first three defaults.
pub fn pages_for(request: &GenerateRequest, config: &Config) -> Vec<String> {
    let mut pages: Vec<String> = match &request.pages {
        Some(pages) if !pages.is_empty() => pages.clone(),
        _ => DEFAULT_PAGES[..3].iter().map(|p| p.to_string()).collect(),
    };
    pages.truncate(config.max_pages);
    pages
}

/// Renders the single instruction document for the code model. Deterministic
/// for a given request, theme, page list and hint set.
pub fn build_site_prompt(
    request: &GenerateRequest,
    theme: Theme,
    pages: &[String],
    hints: &DesignHints,
) -> String {
    let palette = theme.palette();
    let extra_pages: Vec<String> = pages
        .iter()
        .filter(|p| p.as_str() != "index")
        .map(|p| format!("{p}.html"))
        .collect();

    let mut prompt = format!(
        "You are an expert web developer. Generate a complete, modern, responsive multi-page static website.\n\
        \n\
        Requirements:\n\
        - Company Name: {company}\n\
        - Description: {description}\n\
        - Theme Style: {theme_key} - {theme_description}\n\
        - Color Palette: {palette_json}\n\
        - Pages Required: {page_list}\n",
        company = request.company_name,
        description = request.description,
        theme_key = theme.key().to_uppercase(),
        theme_description = theme.description(),
        palette_json = palette.to_json(),
        page_list = pages.join(", "),
    );

    if !hints.is_empty() {
        prompt.push_str(&format!(
            "\nAdditional Design Hints from Images: {}\n",
            serde_json::Value::Object(hints.clone())
        ));
    }

    prompt.push_str(&format!(
        "\nTHEME REQUIREMENTS FOR '{theme_key}':\n\
        {theme_description}\n\
        - Primary Color: {primary}\n\
        - Secondary Color: {secondary}\n\
        - Accent Color: {accent}\n\
        - Background: {background}\n",
        theme_key = theme.key().to_uppercase(),
        theme_description = theme.description(),
        primary = palette.primary,
        secondary = palette.secondary,
        accent = palette.accent,
        background = palette.background,
    ));

    prompt.push_str(&format!(
        "\nGenerate a professional, complete website with these files:\n\
        1. index.html - Homepage with hero section, company overview, call-to-action\n\
        2. {extra} - Additional pages with relevant content\n\
        3. styles.css - Complete responsive styling following the {theme_key} theme\n\
        4. script.js - Interactive features, smooth animations, mobile menu\n",
        extra = if extra_pages.is_empty() {
            "(no additional pages)".to_string()
        } else {
            extra_pages.join(", ")
        },
        theme_key = theme.key(),
    ));

    prompt.push_str(
        "\nCRITICAL DESIGN REQUIREMENTS:\n\
        - Semantic HTML5 with proper structure\n\
        - Mobile-first responsive design (breakpoints: 768px, 1024px, 1280px)\n\
        - CSS Grid and Flexbox for layouts\n\
        - Smooth animations and transitions\n\
        - Professional navigation bar (sticky on desktop)\n\
        - Hero section with compelling headline\n\
        - Feature/service sections with icons or cards\n\
        - Contact form with validation\n\
        - Footer with company info and links\n\
        - Accessibility: ARIA labels, semantic tags, keyboard navigation\n\
        - Modern typography (use system fonts or Google Fonts)\n\
        - Consistent spacing and rhythm\n\
        - Button hover effects and micro-interactions\n",
    );

    if request.require_dark_mode {
        prompt.push_str("- The site must use a dark color scheme by default\n");
    }

    prompt.push_str(&format!(
        "\nReturn ONLY a valid JSON object with this exact structure (no markdown, no code blocks, no explanations):\n\
        {{\n\
        \x20 \"index.html\": \"<!DOCTYPE html>...\",\n\
        \x20 \"about.html\": \"<!DOCTYPE html>...\",\n\
        \x20 \"styles.css\": \"* {{ margin: 0; ...\",\n\
        \x20 \"script.js\": \"// JavaScript code...\"\n\
        }}\n\
        \n\
        Each HTML file must:\n\
        - Be complete and valid\n\
        - Include proper DOCTYPE and meta tags\n\
        - Link to styles.css and script.js\n\
        - Have consistent navigation\n\
        - Be production-ready\n\
        \n\
        Each page should have meaningful, relevant content related to {company} and {description}.\n\
        \n\
        IMPORTANT: Return ONLY the JSON object, nothing else.",
        company = request.company_name,
        description = request.description,
    ));

    prompt
}

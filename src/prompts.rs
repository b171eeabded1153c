pub const STORY_SYSTEM: &str = include_str!("../data/prompts/story_system.txt");
pub const STORY_USER: &str = include_str!("../data/prompts/story_user.txt");
pub const THEME_DEFAULT: &str = include_str!("../data/prompts/theme_default.txt");
pub const THEME_CUSTOM: &str = include_str!("../data/prompts/theme_custom.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Task line for the story prompt. A blank theme falls back to the default
/// free-form instruction.
pub fn theme_instruction(theme: &str) -> String {
    let theme = theme.trim();
    if theme.is_empty() {
        THEME_DEFAULT.trim().to_string()
    } else {
        render(THEME_CUSTOM.trim(), &[("theme", theme)])
    }
}

/// User message sent to the chat model. Captions are space-joined in
/// selection order.
pub fn story_prompt(captions: &[String], instruction: &str) -> String {
    render(
        STORY_USER.trim(),
        &[("captions", &captions.join(" ")), ("task", instruction)],
    )
}

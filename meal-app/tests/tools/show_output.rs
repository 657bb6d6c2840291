use meal_app_lib::application::dto::FavoriteView;
use meal_core::day_view::{ActivitySection, MenuSection};
use meal_core::overview::WeekOverview;

pub fn show_favorite_views_debug_data(views: &[FavoriteView]) {
    println!("\n=======================================================");
    println!("⭐ [DEBUG] お気に入り (計 {} 件)", views.len());
    println!("=======================================================");

    for card in views {
        println!(
            "📌 {} ({} / {}) : {}",
            card.favorite.name,
            card.favorite.menu_type,
            card.favorite.activity_group,
            card.view.day.label
        );

        match &card.view.menu {
            Some(MenuSection::Available(entry)) => {
                println!("   [Menu] {} | {} | {}", entry.first_course, entry.second_course, entry.fruit);
            }
            Some(MenuSection::Unavailable) => println!("   [Menu] (なし)"),
            None => println!("   [Menu] (土曜のため表示しない)"),
        }

        match &card.view.activities {
            ActivitySection::Available(moment) => {
                for (label, text) in moment.labeled() {
                    println!("   {:<22} {}", label, text);
                }
            }
            ActivitySection::Unavailable => println!("   [Attività] (なし)"),
        }
    }
    println!("=======================================================\n");
}

pub fn show_week_overview_debug_data(overview: &WeekOverview) {
    println!("\n📅 [DEBUG] {} (current = {})", overview.title, overview.current);
    for card in &overview.days {
        let badge = card.badge.map(|b| b.text()).unwrap_or("");
        println!(
            "   {:?} {:<6} : {} / {}",
            card.weekday, badge, card.menu.first_course, card.menu.second_course
        );
    }
}

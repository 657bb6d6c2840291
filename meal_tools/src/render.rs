// =====================
// 端末向けの表示
// =====================

use meal_app_lib::application::dto::{AnchorInfo, FavoriteView};
use meal_app_lib::application::offline_worker::InstallReport;
use meal_core::calendar::ItalianWeekday;
use meal_core::day_view::{ActivitySection, MenuSection, ACTIVITY_UNAVAILABLE, MENU_UNAVAILABLE};
use meal_core::menu_model::MenuEntry;
use meal_core::overview::{ActivityDayCard, WeekOverview, NO_ACTIVITIES_FOR_GROUP};

fn rule() {
    println!("{}", "=".repeat(50));
}

fn print_menu(entry: &MenuEntry) {
    println!("   Primo    : {}", entry.first_course);
    println!("   Secondo  : {}", entry.second_course);
    if let Some(side) = &entry.side_dish {
        println!("   Contorno : {}", side);
    }
    println!("   Frutta   : {}", entry.fruit);
}

pub fn favorite_views(views: &[FavoriteView]) {
    if views.is_empty() {
        println!("Nessuna combinazione salvata.");
        return;
    }

    for card in views {
        rule();
        println!(
            "{} [{}]  ({} / {})",
            card.favorite.name,
            card.favorite.id,
            card.favorite.menu_type.display_label(),
            card.favorite.activity_group
        );
        println!("{}", card.view.day.label);
        if card.show_toggle {
            println!("   (Oggi / Domani: {:?})", card.selected);
        }

        match &card.view.menu {
            Some(MenuSection::Available(entry)) => print_menu(entry),
            Some(MenuSection::Unavailable) => println!("   {}", MENU_UNAVAILABLE),
            None => {}
        }

        println!();
        match &card.view.activities {
            ActivitySection::Available(moment) => {
                for (label, text) in moment.labeled() {
                    println!("   {:<11}: {}", label, text);
                }
            }
            ActivitySection::Unavailable => println!("   {}", ACTIVITY_UNAVAILABLE),
        }
    }
    rule();
}

pub fn week_overviews(weeks: &[WeekOverview]) {
    for week in weeks {
        rule();
        let marker = if week.current { "  <- settimana corrente" } else { "" };
        println!("{}{}", week.title, marker);

        if week.days.is_empty() {
            println!("   {}", MENU_UNAVAILABLE);
        }
        for card in &week.days {
            let badge = card.badge.map(|b| format!(" [{}]", b.text())).unwrap_or_default();
            println!("{}{}", card.weekday.to_italian(), badge);
            print_menu(&card.menu);
        }
    }
    rule();
}

pub fn activity_week(group: &str, cards: Option<&[ActivityDayCard]>) {
    rule();
    println!("Attività - {}", group);

    let Some(cards) = cards else {
        println!("   {}", NO_ACTIVITIES_FOR_GROUP);
        rule();
        return;
    };

    for card in cards {
        let badge = card.badge.map(|b| format!(" [{}]", b.text())).unwrap_or_default();
        println!("{}{}", card.weekday.to_italian(), badge);
        for (label, text) in card.moments.labeled() {
            println!("   {:<11}: {}", label, text);
        }
    }
    rule();
}

pub fn anchor_info(info: &AnchorInfo) {
    let source = if info.from_config { "week-config" } else { "ultimo lunedì" };
    println!(
        "Settimana 1 dal {} ({}) - settimana corrente: {}",
        info.label, source, info.current_week
    );
}

pub fn install_report(report: &InstallReport) {
    for url in &report.cached {
        println!("   cached  : {}", url);
    }
    for url in &report.skipped {
        println!("   skipped : {}", url);
    }
}

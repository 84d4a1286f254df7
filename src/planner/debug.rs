use crate::planner::{SearchPlan, Strategy};

pub fn print_plan(plan: &SearchPlan) {
    println!("strategy: {}", plan.strategy.name());
    println!("variables: {}", plan.variables.len());
    println!("mandatory clauses: {}", plan.pattern.mandatory.len());
    println!("optional clauses: {}", plan.pattern.optionals.len());

    match &plan.strategy {
        Strategy::NoSearch => {}
        Strategy::Neighborhood { choices } => {
            for (i, choice) in choices.iter().enumerate() {
                println!("choice[{}]:", i);
                println!("  clause = {}", choice.clause);
                println!("  best_start = {}", choice.best_start);
                match &choice.start_term {
                    Some(term) => println!("  start_term = {}", term),
                    None => println!("  start_term = none"),
                }
            }
        }
        Strategy::LinkType {
            root,
            starter_term,
            search_set,
        }
        | Strategy::VariableType {
            root,
            starter_term,
            search_set,
        } => {
            println!("root = {}", root);
            println!("starter_term = {}", starter_term);
            println!("search set size = {}", search_set.len());
        }
    }
}
